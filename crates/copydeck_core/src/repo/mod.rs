//! Entity Store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repositories never check ownership; that is the guard's job.
//! - Repositories take `&Connection`, so services can hand them a
//!   transaction and compose several writes into one atomic unit.
//! - Missing rows surface as `RepoError::NotFound`, distinct from
//!   transport errors.

pub mod entry_repo;
pub mod error;
pub mod history_repo;
pub mod preset_repo;
pub mod project_repo;
pub(crate) mod schema;
pub mod user_repo;
