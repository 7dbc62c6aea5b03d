//! Domain model for users, projects, copy entries, history and presets.
//!
//! # Responsibility
//! - Define the canonical records shared by repositories and services.
//! - Own field-level validation that does not need storage access.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - `CopyEntry::original_text` is never blank.
//! - Ownership of an entry is derived through its project; entries carry
//!   no ACL of their own.

pub mod entry;
pub mod history;
pub mod preset;
pub mod project;
pub mod user;
pub mod validation;
