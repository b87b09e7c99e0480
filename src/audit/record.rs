//! Audit record structure
//!
//! Every applied adjustment writes one immutable record: the original
//! free text, the parsed intent, before/after snapshots, and the ordered
//! list of changes. Reverts write a new record whose id prefixes the
//! original — history is only ever appended to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::parser::ParsedIntent;
use crate::services::adjustment::AdjustmentDiff;

/// The id prefix marking a revert record
pub const REVERT_PREFIX: &str = "REVERT-";

/// One immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique id, e.g. `adj-20250606T154501-9f3ac1`
    pub audit_id: String,

    /// When the adjustment was applied (UTC)
    pub timestamp: DateTime<Utc>,

    /// The user's original free text
    pub user_text: String,

    /// The structured intent the text parsed into
    pub parsed_intent: ParsedIntent,

    /// Canonical identifiers of the entities the change touched
    pub resolved_entities: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_snapshot: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_snapshot: Option<Value>,

    /// Ordered human-readable descriptions of what was applied
    pub changes_applied: Vec<String>,
}

/// Generate a unique audit id from a timestamp plus a random suffix.
/// The suffix guards against two adjustments landing in the same second.
pub fn new_audit_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("adj-{}-{}", now.format("%Y%m%dT%H%M%S"), &suffix[..6])
}

impl AuditRecord {
    /// Build the record for an applied adjustment
    pub fn from_applied(user_text: impl Into<String>, diff: &AdjustmentDiff, now: DateTime<Utc>) -> Self {
        let resolved_entities = diff
            .intent
            .entity_name
            .iter()
            .cloned()
            .collect();

        Self {
            audit_id: new_audit_id(now),
            timestamp: now,
            user_text: user_text.into(),
            parsed_intent: diff.intent.clone(),
            resolved_entities,
            before_snapshot: diff.before.clone(),
            after_snapshot: diff.after.clone(),
            changes_applied: diff.changes.clone(),
        }
    }

    /// Build the revert record for this one: snapshots swapped, id
    /// derived by prefixing the original id.
    pub fn revert_record(&self, changes_applied: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            audit_id: format!("{REVERT_PREFIX}{}", self.audit_id),
            timestamp: now,
            user_text: format!("revert {}", self.audit_id),
            parsed_intent: self.parsed_intent.clone(),
            resolved_entities: self.resolved_entities.clone(),
            before_snapshot: self.after_snapshot.clone(),
            after_snapshot: self.before_snapshot.clone(),
            changes_applied,
        }
    }

    /// Whether this record is itself a revert
    pub fn is_revert(&self) -> bool {
        self.audit_id.starts_with(REVERT_PREFIX)
    }
}
