//! The cash-flow configuration document
//!
//! A typed tree describing payroll cadence, recurring weekly and monthly
//! obligations, settlement rules, essential budgets, one-off installments,
//! providers, and loop definitions. Loaded once per invocation from a
//! human-editable YAML document, mutated only in memory, and persisted as
//! a whole document on save.
//!
//! Every structure here is an explicit tagged record validated at load
//! time. Mutation by dotted key goes through `set_key`, a closed
//! navigation function that rejects unknown keys instead of reflecting
//! over field names.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, CadenceResult};
use crate::models::{EventType, Money};
use crate::storage::file_io::{read_yaml, write_yaml_atomic};

/// Payroll cadence: when money arrives and how weeks are framed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payroll {
    /// Weekday the paycheck lands
    pub payday: Weekday,
    /// Net pay per check, in cents
    pub net_pay: Money,
    /// Weekday a budgeting week starts on (often the day after payday)
    pub week_start: Weekday,
}

impl Default for Payroll {
    fn default() -> Self {
        Self {
            payday: Weekday::Fri,
            net_pay: Money::zero(),
            week_start: Weekday::Fri,
        }
    }
}

/// How a weekly recurring item settles against the account
///
/// A single-day item posts its full amount on `reserve_day`. A two-stage
/// item debits the full amount on `reserve_day` and records a zero-impact
/// informational entry on `clear_day` (the money already left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRule {
    /// Weekday the amount is debited
    pub reserve_day: Weekday,
    /// Weekday the obligation clears; required when `two_stage` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_day: Option<Weekday>,
    /// Account the reserve is drawn from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_account: Option<String>,
    /// Whether this item uses reserve-then-clear settlement
    #[serde(default)]
    pub two_stage: bool,
}

/// Gas budgeting: cost per fill and how often fills happen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasBudget {
    pub cost_per_fill: Money,
    pub fill_interval_days: u32,
    /// Preferred fill weekdays; advisory, does not alter fill spacing
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
}

impl Default for GasBudget {
    fn default() -> Self {
        Self {
            cost_per_fill: Money::zero(),
            fill_interval_days: 7,
            weekdays: Vec::new(),
        }
    }
}

/// Non-discretionary weekly budgets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Essentials {
    #[serde(default)]
    pub gas: GasBudget,
    #[serde(default)]
    pub food_weekly: Money,
    #[serde(default)]
    pub pets_weekly: Money,
}

impl Essentials {
    /// The weekly essential budget excluding gas (gas is scheduled by
    /// fill interval, not amortized)
    pub fn weekly_total(&self) -> Money {
        self.food_weekly + self.pets_weekly
    }
}

/// A one-off scheduled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub amount: Money,
    pub date: NaiveDate,
    pub provider: String,
    pub category: String,
}

/// A known counterparty: cash-advance product, biller, bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Free-form kind label, e.g. "cash_advance", "credit_card"
    pub kind: String,
    /// Account label the provider settles against
    pub account: String,
}

/// One matching criterion inside a loop definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopCriterion {
    pub event_type: EventType,
    /// When set, only events from this provider match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// A named recurring draw/repay relationship, e.g. a cash-advance product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopDef {
    pub name: String,
    pub includes: Vec<LoopCriterion>,
}

fn default_safety_buffer() -> Money {
    Money::from_dollars(100)
}

/// The whole configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowConfig {
    #[serde(default)]
    pub payroll: Payroll,

    /// Known account labels
    #[serde(default)]
    pub accounts: Vec<String>,

    /// Weekly recurring items: name -> amount per week
    #[serde(default)]
    pub recurring_weekly: BTreeMap<String, Money>,

    /// Settlement rules keyed by weekly item name
    #[serde(default)]
    pub weekly_rules: BTreeMap<String, SettlementRule>,

    /// Monthly recurring items: name -> amount per month
    #[serde(default)]
    pub recurring_monthly: BTreeMap<String, Money>,

    #[serde(default)]
    pub essentials: Essentials,

    /// One-off installments keyed by name
    #[serde(default)]
    pub installments: BTreeMap<String, Installment>,

    /// Providers keyed by name
    #[serde(default)]
    pub providers: BTreeMap<String, Provider>,

    /// Loop definitions
    #[serde(default)]
    pub loops: Vec<LoopDef>,

    /// Categories treated as non-discretionary
    #[serde(default)]
    pub essential_categories: BTreeSet<String>,

    /// Balance floor protected from the discretionary estimate
    #[serde(default = "default_safety_buffer")]
    pub safety_buffer: Money,
}

impl Default for CashFlowConfig {
    fn default() -> Self {
        Self {
            payroll: Payroll::default(),
            accounts: Vec::new(),
            recurring_weekly: BTreeMap::new(),
            weekly_rules: BTreeMap::new(),
            recurring_monthly: BTreeMap::new(),
            essentials: Essentials::default(),
            installments: BTreeMap::new(),
            providers: BTreeMap::new(),
            loops: Vec::new(),
            essential_categories: BTreeSet::new(),
            safety_buffer: default_safety_buffer(),
        }
    }
}

impl CashFlowConfig {
    /// Load the document from disk, falling back to defaults when the file
    /// does not exist yet, and validate it.
    pub fn load(path: &Path) -> CadenceResult<Self> {
        let config: Self = read_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the whole document atomically
    pub fn save(&self, path: &Path) -> CadenceResult<()> {
        write_yaml_atomic(path, self)
    }

    /// Structural validation applied at load time
    pub fn validate(&self) -> CadenceResult<()> {
        if self.essentials.gas.fill_interval_days == 0 {
            return Err(CadenceError::Validation(
                "essentials.gas.fill_interval_days must be at least 1".into(),
            ));
        }
        for (name, rule) in &self.weekly_rules {
            if rule.two_stage && rule.clear_day.is_none() {
                return Err(CadenceError::Validation(format!(
                    "weekly rule '{name}' is two-stage but has no clear_day"
                )));
            }
        }
        for loop_def in &self.loops {
            if loop_def.name.trim().is_empty() {
                return Err(CadenceError::Validation("loop with empty name".into()));
            }
            if loop_def.includes.is_empty() {
                return Err(CadenceError::Validation(format!(
                    "loop '{}' has no match criteria",
                    loop_def.name
                )));
            }
        }
        let mut seen = BTreeSet::new();
        for loop_def in &self.loops {
            if !seen.insert(loop_def.name.to_ascii_lowercase()) {
                return Err(CadenceError::Validation(format!(
                    "duplicate loop name '{}'",
                    loop_def.name
                )));
            }
        }
        Ok(())
    }

    /// Find a loop definition by name, case-insensitively
    pub fn loop_named(&self, name: &str) -> Option<&LoopDef> {
        self.loops.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// The settlement rule for a weekly item, if one is configured
    pub fn rule_for(&self, item: &str) -> Option<&SettlementRule> {
        self.weekly_rules.get(item)
    }

    /// Look up a weekly or monthly recurring amount by item name
    pub fn recurring_amount(&self, item: &str) -> Option<Money> {
        self.recurring_weekly
            .get(item)
            .or_else(|| self.recurring_monthly.get(item))
            .copied()
    }

    /// Set a configuration value by dotted key.
    ///
    /// Only the closed set of known key shapes is navigable; anything else
    /// is a fatal `UnknownKey` error, by design — this path is for
    /// automation, not user typos.
    pub fn set_key(&mut self, key: &str, value: &str) -> CadenceResult<()> {
        let unknown = || CadenceError::UnknownKey(key.to_string());
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["payroll", "payday"] => {
                self.payroll.payday = parse_weekday(value)?;
            }
            ["payroll", "week_start"] => {
                self.payroll.week_start = parse_weekday(value)?;
            }
            ["payroll", "net_pay"] => {
                self.payroll.net_pay = Money::parse(value)?;
            }
            ["recurring", "weekly", name] => {
                self.recurring_weekly
                    .insert((*name).to_string(), Money::parse(value)?);
            }
            ["recurring", "monthly", name] => {
                self.recurring_monthly
                    .insert((*name).to_string(), Money::parse(value)?);
            }
            ["essentials", "food_weekly"] => {
                self.essentials.food_weekly = Money::parse(value)?;
            }
            ["essentials", "pets_weekly"] => {
                self.essentials.pets_weekly = Money::parse(value)?;
            }
            ["essentials", "gas", "cost_per_fill"] => {
                self.essentials.gas.cost_per_fill = Money::parse(value)?;
            }
            ["essentials", "gas", "fill_interval_days"] => {
                let days: u32 = value
                    .parse()
                    .map_err(|_| CadenceError::Parse(format!("invalid day count: {value}")))?;
                if days == 0 {
                    return Err(CadenceError::Validation(
                        "fill interval must be at least 1 day".into(),
                    ));
                }
                self.essentials.gas.fill_interval_days = days;
            }
            ["safety_buffer"] => {
                self.safety_buffer = Money::parse(value)?;
            }
            _ => return Err(unknown()),
        }

        Ok(())
    }
}

fn parse_weekday(value: &str) -> CadenceResult<Weekday> {
    value
        .parse::<Weekday>()
        .map_err(|_| CadenceError::Parse(format!("invalid weekday: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> CashFlowConfig {
        let mut config = CashFlowConfig {
            payroll: Payroll {
                payday: Weekday::Thu,
                net_pay: Money::from_dollars(1500),
                week_start: Weekday::Fri,
            },
            accounts: vec!["checking".into(), "savings".into()],
            ..CashFlowConfig::default()
        };
        config
            .recurring_weekly
            .insert("EarnIn".into(), Money::from_dollars(600));
        config.weekly_rules.insert(
            "EarnIn".into(),
            SettlementRule {
                reserve_day: Weekday::Wed,
                clear_day: Some(Weekday::Thu),
                reserve_account: Some("checking".into()),
                two_stage: true,
            },
        );
        config
            .recurring_monthly
            .insert("rent".into(), Money::from_dollars(950));
        config.essentials = Essentials {
            gas: GasBudget {
                cost_per_fill: Money::from_dollars(35),
                fill_interval_days: 4,
                weekdays: vec![Weekday::Mon, Weekday::Fri],
            },
            food_weekly: Money::from_dollars(70),
            pets_weekly: Money::from_dollars(21),
        };
        config.installments.insert(
            "phone".into(),
            Installment {
                amount: Money::from_dollars(45),
                date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
                provider: "Klarna".into(),
                category: "electronics".into(),
            },
        );
        config.providers.insert(
            "EarnIn".into(),
            Provider {
                kind: "cash_advance".into(),
                account: "checking".into(),
            },
        );
        config.loops.push(LoopDef {
            name: "earnin".into(),
            includes: vec![
                LoopCriterion {
                    event_type: EventType::Advance,
                    provider: Some("EarnIn".into()),
                },
                LoopCriterion {
                    event_type: EventType::Repayment,
                    provider: Some("EarnIn".into()),
                },
            ],
        });
        config.essential_categories.insert("gas".into());
        config.essential_categories.insert("food".into());
        config
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        let config = sample_config();

        config.save(&path).unwrap();
        let loaded = CashFlowConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = CashFlowConfig::load(&temp.path().join("nope.yaml")).unwrap();
        assert_eq!(config, CashFlowConfig::default());
        assert_eq!(config.safety_buffer, Money::from_dollars(100));
    }

    #[test]
    fn test_validate_two_stage_needs_clear_day() {
        let mut config = sample_config();
        config.weekly_rules.get_mut("EarnIn").unwrap().clear_day = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_loop() {
        let mut config = sample_config();
        config.loops[0].includes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_loop_names() {
        let mut config = sample_config();
        let dup = config.loops[0].clone();
        config.loops.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_loop_named_case_insensitive() {
        let config = sample_config();
        assert!(config.loop_named("EarnIn").is_some());
        assert!(config.loop_named("klover").is_none());
    }

    #[test]
    fn test_set_key_known_paths() {
        let mut config = sample_config();

        config.set_key("payroll.net_pay", "1650").unwrap();
        assert_eq!(config.payroll.net_pay, Money::from_dollars(1650));

        config.set_key("payroll.payday", "fri").unwrap();
        assert_eq!(config.payroll.payday, Weekday::Fri);

        config.set_key("recurring.weekly.EarnIn", "300").unwrap();
        assert_eq!(
            config.recurring_weekly["EarnIn"],
            Money::from_dollars(300)
        );

        config.set_key("essentials.gas.fill_interval_days", "5").unwrap();
        assert_eq!(config.essentials.gas.fill_interval_days, 5);

        config.set_key("safety_buffer", "150").unwrap();
        assert_eq!(config.safety_buffer, Money::from_dollars(150));
    }

    #[test]
    fn test_set_key_unknown_is_fatal() {
        let mut config = sample_config();
        let err = config.set_key("payroll.bogus", "1").unwrap_err();
        assert!(matches!(err, CadenceError::UnknownKey(_)));

        let err = config.set_key("loops.earnin.name", "x").unwrap_err();
        assert!(matches!(err, CadenceError::UnknownKey(_)));
    }

    #[test]
    fn test_recurring_amount_checks_both_cadences() {
        let config = sample_config();
        assert_eq!(
            config.recurring_amount("EarnIn"),
            Some(Money::from_dollars(600))
        );
        assert_eq!(
            config.recurring_amount("rent"),
            Some(Money::from_dollars(950))
        );
        assert_eq!(config.recurring_amount("netflix"), None);
    }
}
