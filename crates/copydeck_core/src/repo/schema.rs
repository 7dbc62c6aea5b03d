//! Connection readiness checks and shared row/statement helpers.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

/// SQL expression for "now" in epoch milliseconds.
///
/// Must stay identical to the column defaults in the migrations.
pub(crate) const NOW_MS_SQL: &str =
    "(CAST(ROUND((julianday('now') - 2440587.5) * 86400000.0) AS INTEGER))";

/// Verifies migration version plus the tables/columns a repository reads.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in requirements {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Collects `column = ?` assignments for a partial UPDATE.
///
/// Column names are always `'static` literals chosen by the caller, never
/// user input; values are bound as parameters.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    sets: Vec<String>,
    values: Vec<Value>,
}

impl Assignments {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, column: &'static str, value: Value) {
        self.values.push(value);
        self.sets.push(format!("{column} = ?{}", self.values.len()));
    }

    pub(crate) fn set_text(&mut self, column: &'static str, value: Option<&str>) {
        self.set(column, text_value(value));
    }

    /// Runs `UPDATE {table} SET ... WHERE id = ?` and bumps `updated_at`.
    ///
    /// Returns the number of changed rows.
    pub(crate) fn execute(
        mut self,
        conn: &Connection,
        table: &'static str,
        id: Uuid,
    ) -> RepoResult<usize> {
        self.sets.push(format!("updated_at = {NOW_MS_SQL}"));
        self.values.push(Value::Text(id.to_string()));
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{};",
            self.sets.join(", "),
            self.values.len()
        );
        let changed = conn.execute(&sql, params_from_iter(self.values))?;
        Ok(changed)
    }
}

pub(crate) fn text_value(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>, column: &str) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::NOW_MS_SQL;
    use rusqlite::Connection;

    #[test]
    fn now_expression_keeps_millisecond_precision() {
        let conn = Connection::open_in_memory().unwrap();
        let fixed = NOW_MS_SQL.replace("'now'", "'2024-01-01 00:00:00.123'");
        let millis: i64 = conn
            .query_row(&format!("SELECT {fixed};"), [], |row| row.get(0))
            .unwrap();
        assert_eq!(millis, 1_704_067_200_123);
    }

    #[test]
    fn migrations_use_the_same_now_expression() {
        for sql in [
            include_str!("../db/migrations/0001_init.sql"),
            include_str!("../db/migrations/0003_history_presets.sql"),
        ] {
            assert!(sql.contains(NOW_MS_SQL));
            assert!(!sql.contains("strftime"));
        }
    }
}
