//! Audit trail for applied adjustments
//!
//! Immutable, append-only records with a revert path. See `record` for
//! the document shape and `store` for persistence.

pub mod record;
pub mod store;

pub use record::{new_audit_id, AuditRecord, REVERT_PREFIX};
pub use store::AuditStore;
