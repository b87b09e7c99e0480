//! User profile: the debt ledger
//!
//! Debts are the entities payoff and cancel instructions target. Balances
//! are cents like everything else; a paid-off debt keeps its record with
//! balance zero and the closed flag set, so history stays inspectable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CadenceResult;
use crate::models::Money;
use crate::storage::file_io::{read_yaml, write_yaml_atomic};

/// A tracked debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Display name, e.g. "Chase Slate"
    pub name: String,

    /// Provider name when the debt belongs to a known provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Outstanding balance in cents (positive = owed)
    pub balance: Money,

    /// Set when the debt is paid off or cancelled
    #[serde(default)]
    pub closed: bool,
}

impl Debt {
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            provider: None,
            balance,
            closed: false,
        }
    }
}

/// The user profile document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub debts: Vec<Debt>,
}

impl UserProfile {
    /// Load the profile, defaulting to empty when the file is missing
    pub fn load(path: &Path) -> CadenceResult<Self> {
        read_yaml(path)
    }

    /// Persist the whole profile atomically
    pub fn save(&self, path: &Path) -> CadenceResult<()> {
        write_yaml_atomic(path, self)
    }

    /// Find a debt by name, case-insensitively
    pub fn find_debt(&self, name: &str) -> Option<&Debt> {
        self.debts.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Mutable lookup by name, case-insensitively
    pub fn find_debt_mut(&mut self, name: &str) -> Option<&mut Debt> {
        self.debts
            .iter_mut()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Names of debts that are still open
    pub fn open_debt_names(&self) -> Vec<String> {
        self.debts
            .iter()
            .filter(|d| !d.closed)
            .map(|d| d.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_profile() -> UserProfile {
        UserProfile {
            debts: vec![
                Debt {
                    name: "Chase Slate".into(),
                    provider: Some("Chase".into()),
                    balance: Money::from_dollars(2400),
                    closed: false,
                },
                Debt::new("Affirm couch", Money::from_dollars(380)),
            ],
        }
    }

    #[test]
    fn test_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profile.yaml");
        let profile = sample_profile();

        profile.save(&path).unwrap();
        let loaded = UserProfile::load(&path).unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let profile = UserProfile::load(&temp.path().join("none.yaml")).unwrap();
        assert!(profile.debts.is_empty());
    }

    #[test]
    fn test_find_debt_case_insensitive() {
        let profile = sample_profile();
        assert!(profile.find_debt("chase slate").is_some());
        assert!(profile.find_debt("CHASE SLATE").is_some());
        assert!(profile.find_debt("Discover It").is_none());
    }

    #[test]
    fn test_open_debt_names_skips_closed() {
        let mut profile = sample_profile();
        profile.find_debt_mut("Affirm couch").unwrap().closed = true;
        assert_eq!(profile.open_debt_names(), vec!["Chase Slate".to_string()]);
    }
}
