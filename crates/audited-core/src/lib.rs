//! # audited-core
//!
//! Core types for creator/updater audit stamping.
//!
//! This crate provides the pieces shared by the record layer and the
//! lifecycle hooks:
//! - `AuditFields`, the field set a record embeds to become auditable
//! - The `Auditable` capability and its blanket impl over `HasAuditFields`
//! - `Principal`, the `{id, role}` pair of the acting user
//! - `WriteContext`, the per-write key/value context passed to every write
//! - `PrincipalResolver`, which turns a context value into a `Principal`
//! - Persisted column names and cross-cutting error types

pub mod audit;
pub mod columns;
pub mod context;
pub mod errors;
pub mod principal;

pub use audit::{AuditFields, Auditable, HasAuditFields};
pub use context::{CURRENT_USER_KEY, WriteContext};
pub use errors::{CoreError, PrincipalError};
pub use principal::{Principal, PrincipalResolver};
