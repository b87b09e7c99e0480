//! Audit store: one JSON document per record
//!
//! Records live at `<data>/audits/<audit_id>.json`. Writes refuse to
//! overwrite an existing record — immutability is enforced here, not
//! just promised. The revert path loads the original, re-applies its
//! before-snapshot through the adjustment service, and writes a fresh
//! `REVERT-` record; the original file is untouched.

use std::path::PathBuf;

use chrono::Utc;

use crate::config::{CadencePaths, CashFlowConfig, UserProfile};
use crate::error::{CadenceError, CadenceResult};
use crate::services::adjustment::{revert_changes, AdjustmentDiff};
use crate::storage::file_io::{read_json_required, write_json_atomic};

use super::record::{AuditRecord, REVERT_PREFIX};

/// File-backed audit record store
pub struct AuditStore {
    dir: PathBuf,
}

impl AuditStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, audit_id: &str) -> PathBuf {
        self.dir.join(format!("{audit_id}.json"))
    }

    /// Write a record. Fails if a record with the same id already exists.
    pub fn save(&self, record: &AuditRecord) -> CadenceResult<()> {
        let path = self.record_path(&record.audit_id);
        if path.exists() {
            return Err(CadenceError::Audit(format!(
                "audit record '{}' already exists",
                record.audit_id
            )));
        }
        write_json_atomic(&path, record)
    }

    /// Record an applied adjustment and return the stored record
    pub fn save_applied(&self, user_text: &str, diff: &AdjustmentDiff) -> CadenceResult<AuditRecord> {
        let record = AuditRecord::from_applied(user_text, diff, Utc::now());
        self.save(&record)?;
        Ok(record)
    }

    /// Load one record by id
    pub fn load(&self, audit_id: &str) -> CadenceResult<AuditRecord> {
        let path = self.record_path(audit_id);
        if !path.exists() {
            return Err(CadenceError::audit_not_found(audit_id));
        }
        read_json_required(&path)
    }

    /// All records, oldest first
    pub fn list(&self) -> CadenceResult<Vec<AuditRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .map_err(|e| CadenceError::Audit(format!("failed to read audit dir: {e}")))?
        {
            let entry = entry.map_err(|e| CadenceError::Audit(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                records.push(read_json_required::<AuditRecord, _>(&path)?);
            }
        }
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }

    /// Undo a previously applied adjustment.
    ///
    /// Re-applies the original record's before-snapshot as a fresh change
    /// and writes a new `REVERT-` record. Reverting a revert is refused.
    pub fn revert(
        &self,
        audit_id: &str,
        config: &mut CashFlowConfig,
        profile: &mut UserProfile,
        paths: &CadencePaths,
    ) -> CadenceResult<AuditRecord> {
        if audit_id.starts_with(REVERT_PREFIX) {
            return Err(CadenceError::Audit(
                "revert records cannot themselves be reverted".into(),
            ));
        }
        if self.record_path(&format!("{REVERT_PREFIX}{audit_id}")).exists() {
            return Err(CadenceError::Audit(format!(
                "audit record '{audit_id}' was already reverted"
            )));
        }

        let original = self.load(audit_id)?;
        let changes = revert_changes(
            &original.parsed_intent,
            original.before_snapshot.as_ref(),
            original.after_snapshot.as_ref(),
            config,
            profile,
            paths,
        )?;

        let revert = original.revert_record(changes, Utc::now());
        self.save(&revert)?;
        Ok(revert)
    }
}
