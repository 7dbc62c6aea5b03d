//! Structured-field codec for JSON text columns.
//!
//! # Responsibility
//! - Encode optional structured fields (`custom_versions`, `custom_limits`,
//!   `tags`, preset lists/maps) to JSON text on write.
//! - Decode them on read without ever failing the enclosing operation.
//!
//! # Invariants
//! - Decoding is fail-soft: blank, `null` and malformed text all degrade to
//!   "absent"; only [`Decoded::Malformed`] tells them apart for diagnostics.
//! - Encoding never emits `null`; absent values are stored as SQL `NULL`.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Outcome of decoding one stored structured field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// Column is `NULL`, blank, or JSON `null`.
    Absent,
    /// Column decoded successfully.
    Present(T),
    /// Column holds text that does not match the expected shape.
    Malformed,
}

impl<T> Decoded<T> {
    /// Converts into an option, treating malformed input as absent.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Malformed => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }
}

/// Decodes one stored JSON text column.
pub fn decode_field<T: DeserializeOwned>(raw: Option<&str>) -> Decoded<T> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Decoded::Absent;
    };

    match serde_json::from_str::<Option<T>>(text) {
        Ok(Some(value)) => Decoded::Present(value),
        Ok(None) => Decoded::Absent,
        Err(_) => Decoded::Malformed,
    }
}

/// Decodes one stored JSON text column, falling back to `T::default()`.
pub fn decode_or_default<T: DeserializeOwned + Default>(raw: Option<&str>) -> T {
    decode_field(raw).into_option().unwrap_or_default()
}

/// Encodes one structured value as JSON text.
pub fn encode_field<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Encodes an optional structured value; `None` stays SQL `NULL`.
pub fn encode_optional<T: Serialize>(value: Option<&T>) -> Result<Option<String>, serde_json::Error> {
    value.map(encode_field).transpose()
}

#[cfg(test)]
mod tests {
    use super::{decode_field, decode_or_default, encode_optional, Decoded};
    use std::collections::BTreeMap;

    #[test]
    fn decode_treats_blank_and_null_as_absent() {
        assert_eq!(decode_field::<Vec<String>>(None), Decoded::Absent);
        assert_eq!(decode_field::<Vec<String>>(Some("   ")), Decoded::Absent);
        assert_eq!(decode_field::<Vec<String>>(Some("null")), Decoded::Absent);
    }

    #[test]
    fn decode_reports_malformed_text_without_failing() {
        let decoded = decode_field::<BTreeMap<String, String>>(Some("{not json"));
        assert!(decoded.is_malformed());
        assert_eq!(decoded.into_option(), None);

        let wrong_shape = decode_field::<BTreeMap<String, String>>(Some("[1, 2]"));
        assert!(wrong_shape.is_malformed());
    }

    #[test]
    fn decode_or_default_recovers_to_empty_value() {
        let tags: Vec<String> = decode_or_default(Some("\"oops\""));
        assert!(tags.is_empty());

        let tags: Vec<String> = decode_or_default(Some(r#"["launch","promo"]"#));
        assert_eq!(tags, vec!["launch".to_string(), "promo".to_string()]);
    }

    #[test]
    fn encode_optional_keeps_none_as_null_column() {
        assert_eq!(encode_optional::<Vec<String>>(None).unwrap(), None);
        assert_eq!(
            encode_optional(Some(&vec!["a".to_string()])).unwrap(),
            Some(r#"["a"]"#.to_string())
        );
    }
}
