//! Adjustment pipeline: intent -> diff -> apply
//!
//! A parsed intent becomes an `AdjustmentDiff` holding before/after
//! snapshots and human-readable change descriptions. The diff is shown to
//! the caller, and only an externally confirmed, `safe` diff may be
//! applied. Missing entities and rule conflicts never raise — they come
//! back as warnings with `safe = false` so the presentation layer can
//! render them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{CadencePaths, CashFlowConfig, Installment, UserProfile};
use crate::error::{CadenceError, CadenceResult};
use crate::models::Money;
use crate::parser::{IntentAction, ParsedIntent};

/// A proposed configuration/profile change, ready for confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentDiff {
    /// The intent that produced this diff
    pub intent: ParsedIntent,
    /// Snapshot of the targeted state before the change
    pub before: Option<Value>,
    /// Snapshot of the state the change produces
    pub after: Option<Value>,
    /// Ordered human-readable change descriptions
    pub changes: Vec<String>,
    /// Problems the caller should see before confirming
    pub warnings: Vec<String>,
    /// Never applied when false
    pub safe: bool,
}

impl AdjustmentDiff {
    fn unsafe_with(intent: ParsedIntent, warning: impl Into<String>) -> Self {
        Self {
            intent,
            before: None,
            after: None,
            changes: Vec::new(),
            warnings: vec![warning.into()],
            safe: false,
        }
    }
}

fn param_money(intent: &ParsedIntent, key: &str) -> Option<Money> {
    intent
        .params
        .get(key)
        .and_then(|v| v.parse::<i64>().ok())
        .map(Money::from_cents)
}

fn param_date(intent: &ParsedIntent, key: &str) -> Option<NaiveDate> {
    intent
        .params
        .get(key)
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

/// Build the before/after diff for an intent against the current
/// configuration and profile. Resolution failures produce an unsafe diff
/// with an explanatory warning, never an error.
pub fn create_diff(
    intent: &ParsedIntent,
    config: &CashFlowConfig,
    profile: &UserProfile,
    today: NaiveDate,
) -> AdjustmentDiff {
    match intent.action {
        IntentAction::Payoff => payoff_diff(intent, profile),
        IntentAction::ChangeAmount => change_amount_diff(intent, config),
        IntentAction::Defer => defer_diff(intent),
        IntentAction::AddInstallment => add_installment_diff(intent, config),
        IntentAction::Cancel => cancel_diff(intent, config, profile, today),
        IntentAction::Unknown => AdjustmentDiff::unsafe_with(
            intent.clone(),
            "Instruction was not understood; nothing to change",
        ),
    }
}

fn payoff_diff(intent: &ParsedIntent, profile: &UserProfile) -> AdjustmentDiff {
    let Some(name) = intent.entity_name.as_deref() else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No matching debt found to pay off");
    };
    let Some(debt) = profile.find_debt(name) else {
        return AdjustmentDiff::unsafe_with(
            intent.clone(),
            format!("Debt '{name}' not found in the profile"),
        );
    };

    let mut warnings = Vec::new();
    if debt.closed {
        warnings.push(format!("'{}' is already marked closed", debt.name));
    }
    if intent.ambiguous {
        warnings.push(format!(
            "Multiple debts matched; using '{}' (also matched: {})",
            debt.name,
            intent.alternatives.join(", ")
        ));
    }

    AdjustmentDiff {
        intent: intent.clone(),
        before: Some(json!({
            "name": debt.name,
            "balance_cents": debt.balance.cents(),
            "closed": debt.closed,
        })),
        after: Some(json!({
            "name": debt.name,
            "balance_cents": 0,
            "closed": true,
        })),
        changes: vec![
            format!("{}: balance {} -> $0.00", debt.name, debt.balance),
            format!("{}: marked closed", debt.name),
        ],
        warnings,
        safe: true,
    }
}

fn change_amount_diff(intent: &ParsedIntent, config: &CashFlowConfig) -> AdjustmentDiff {
    let Some(name) = intent.entity_name.as_deref() else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No matching recurring item found");
    };
    let Some(current) = config.recurring_amount(name) else {
        return AdjustmentDiff::unsafe_with(
            intent.clone(),
            format!("Recurring item '{name}' not found in the configuration"),
        );
    };
    let Some(new_amount) = param_money(intent, "amount_cents") else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No new amount was given");
    };

    let mut warnings = Vec::new();
    if config.rule_for(name).is_some() && new_amount != current {
        warnings.push(format!(
            "'{name}' has special settlement rules; its usual amount is {current}"
        ));
    }

    let effective = intent
        .params
        .get("effective_date")
        .cloned()
        .unwrap_or_else(|| "next cycle".to_string());

    AdjustmentDiff {
        intent: intent.clone(),
        before: Some(json!({ "name": name, "amount_cents": current.cents() })),
        after: Some(json!({ "name": name, "amount_cents": new_amount.cents() })),
        changes: vec![format!(
            "{name}: amount {current} -> {new_amount} (effective {effective})"
        )],
        warnings,
        safe: true,
    }
}

fn defer_diff(intent: &ParsedIntent) -> AdjustmentDiff {
    let Some(name) = intent.entity_name.as_deref() else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No matching item found to defer");
    };
    let days = intent
        .params
        .get("days")
        .cloned()
        .unwrap_or_else(|| "7".to_string());

    // Deferral shifts only the next due date; recurring state is untouched
    AdjustmentDiff {
        intent: intent.clone(),
        before: None,
        after: None,
        changes: vec![format!("Deferral of {days} days recorded for {name}")],
        warnings: vec![
            "Deferral shifts only the next due date and does not change the recurring model"
                .to_string(),
        ],
        safe: true,
    }
}

fn add_installment_diff(intent: &ParsedIntent, config: &CashFlowConfig) -> AdjustmentDiff {
    let Some(amount) = param_money(intent, "amount_cents") else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No installment amount was given");
    };
    let Some(date) = param_date(intent, "date") else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No installment date was given");
    };

    let provider = intent
        .params
        .get("provider")
        .cloned()
        .unwrap_or_else(|| "unspecified".to_string());
    let name = format!("{provider} {date}");

    if config.installments.contains_key(&name) {
        return AdjustmentDiff::unsafe_with(
            intent.clone(),
            format!("Installment '{name}' already exists"),
        );
    }

    AdjustmentDiff {
        intent: intent.clone(),
        before: None,
        after: Some(json!({
            "name": name,
            "amount_cents": amount.cents(),
            "date": date.to_string(),
            "provider": provider,
            "category": "installment",
        })),
        changes: vec![format!("Add installment {name}: {amount} due {date}")],
        warnings: Vec::new(),
        safe: true,
    }
}

fn cancel_diff(
    intent: &ParsedIntent,
    config: &CashFlowConfig,
    profile: &UserProfile,
    today: NaiveDate,
) -> AdjustmentDiff {
    let Some(name) = intent.entity_name.as_deref() else {
        return AdjustmentDiff::unsafe_with(intent.clone(), "No matching item found to cancel");
    };

    if let Some(amount) = config.recurring_amount(name) {
        return AdjustmentDiff {
            intent: intent.clone(),
            before: Some(json!({ "name": name, "amount_cents": amount.cents() })),
            after: Some(json!({ "name": name, "inactive_from": today.to_string() })),
            changes: vec![format!("{name} marked inactive from {today}")],
            warnings: Vec::new(),
            safe: true,
        };
    }

    if let Some(installment) = config.installments.get(name) {
        return AdjustmentDiff {
            intent: intent.clone(),
            before: Some(json!({
                "name": name,
                "amount_cents": installment.amount.cents(),
                "date": installment.date.to_string(),
                "provider": installment.provider,
                "category": installment.category,
            })),
            after: Some(json!({ "name": name, "inactive_from": today.to_string() })),
            changes: vec![format!("Installment {name} cancelled from {today}")],
            warnings: Vec::new(),
            safe: true,
        };
    }

    if let Some(debt) = profile.find_debt(name) {
        return AdjustmentDiff {
            intent: intent.clone(),
            before: Some(json!({
                "name": debt.name,
                "balance_cents": debt.balance.cents(),
                "closed": debt.closed,
            })),
            after: Some(json!({
                "name": debt.name,
                "balance_cents": debt.balance.cents(),
                "closed": true,
            })),
            changes: vec![format!("{} marked inactive from {today}", debt.name)],
            warnings: Vec::new(),
            safe: true,
        };
    }

    AdjustmentDiff::unsafe_with(intent.clone(), format!("'{name}' not found to cancel"))
}

/// Commit a confirmed diff into the configuration/profile and persist the
/// touched documents. Returns `Ok(false)` without mutating anything when
/// the diff is unsafe.
pub fn apply_adjustment(
    diff: &AdjustmentDiff,
    config: &mut CashFlowConfig,
    profile: &mut UserProfile,
    paths: &CadencePaths,
) -> CadenceResult<bool> {
    if !diff.safe {
        return Ok(false);
    }

    let name = diff.intent.entity_name.as_deref();

    match diff.intent.action {
        IntentAction::Payoff => {
            let name = name.ok_or_else(|| CadenceError::Validation("payoff without entity".into()))?;
            let debt = profile
                .find_debt_mut(name)
                .ok_or_else(|| CadenceError::debt_not_found(name))?;
            debt.balance = Money::zero();
            debt.closed = true;
            profile.save(&paths.profile_file())?;
        }
        IntentAction::ChangeAmount => {
            let name =
                name.ok_or_else(|| CadenceError::Validation("change without entity".into()))?;
            let amount = param_money(&diff.intent, "amount_cents")
                .ok_or_else(|| CadenceError::Validation("change without amount".into()))?;
            set_recurring(config, name, amount)?;
            config.save(&paths.config_file())?;
        }
        IntentAction::Defer => {
            // Informational only; the audit record is the whole effect
        }
        IntentAction::AddInstallment => {
            let after = diff
                .after
                .as_ref()
                .ok_or_else(|| CadenceError::Validation("installment diff without after".into()))?;
            let (name, installment) = installment_from_snapshot(after)?;
            config.installments.insert(name, installment);
            config.save(&paths.config_file())?;
        }
        IntentAction::Cancel => {
            let name =
                name.ok_or_else(|| CadenceError::Validation("cancel without entity".into()))?;
            if config.recurring_weekly.remove(name).is_some()
                || config.recurring_monthly.remove(name).is_some()
            {
                // The settlement rule stays so a revert restores the item whole
                config.save(&paths.config_file())?;
            } else if config.installments.remove(name).is_some() {
                config.save(&paths.config_file())?;
            } else if let Some(debt) = profile.find_debt_mut(name) {
                debt.closed = true;
                profile.save(&paths.profile_file())?;
            } else {
                return Err(CadenceError::recurring_not_found(name));
            }
        }
        IntentAction::Unknown => return Ok(false),
    }

    Ok(true)
}

/// Re-apply a record's before-snapshot, undoing a previously applied
/// adjustment. Used by the revert path; the original audit record is
/// never touched.
pub fn revert_changes(
    intent: &ParsedIntent,
    before: Option<&Value>,
    after: Option<&Value>,
    config: &mut CashFlowConfig,
    profile: &mut UserProfile,
    paths: &CadencePaths,
) -> CadenceResult<Vec<String>> {
    let mut changes = Vec::new();

    match intent.action {
        IntentAction::Payoff | IntentAction::Cancel
            if before.is_some_and(|b| b.get("balance_cents").is_some()) =>
        {
            let before = before.unwrap();
            let name = snapshot_str(before, "name")?;
            let balance = Money::from_cents(snapshot_i64(before, "balance_cents")?);
            let closed = before.get("closed").and_then(Value::as_bool).unwrap_or(false);

            match profile.find_debt_mut(&name) {
                Some(debt) => {
                    debt.balance = balance;
                    debt.closed = closed;
                }
                None => profile.debts.push(crate::config::Debt {
                    name: name.clone(),
                    provider: None,
                    balance,
                    closed,
                }),
            }
            profile.save(&paths.profile_file())?;
            changes.push(format!("{name}: restored balance {balance}, closed={closed}"));
        }
        IntentAction::ChangeAmount | IntentAction::Cancel => {
            let before = before
                .ok_or_else(|| CadenceError::Audit("record has no before snapshot".into()))?;
            let name = snapshot_str(before, "name")?;
            if before.get("date").is_some() {
                // A cancelled installment: restore the full record
                let (name, installment) = installment_from_snapshot(before)?;
                changes.push(format!("Installment {name} restored"));
                config.installments.insert(name, installment);
            } else {
                let amount = Money::from_cents(snapshot_i64(before, "amount_cents")?);
                set_recurring(config, &name, amount)?;
                changes.push(format!("{name}: restored amount {amount}"));
            }
            config.save(&paths.config_file())?;
        }
        IntentAction::AddInstallment => {
            let after = after
                .ok_or_else(|| CadenceError::Audit("record has no after snapshot".into()))?;
            let name = snapshot_str(after, "name")?;
            config.installments.remove(&name);
            config.save(&paths.config_file())?;
            changes.push(format!("Installment {name} removed"));
        }
        IntentAction::Defer => {
            changes.push("Deferral was informational; nothing to restore".to_string());
        }
        _ => {
            return Err(CadenceError::Audit(
                "record's intent cannot be reverted".into(),
            ))
        }
    }

    Ok(changes)
}

/// Update a recurring amount in whichever cadence holds the item; an item
/// in neither map is re-created as weekly (the common case for reverts of
/// a cancelled weekly item).
fn set_recurring(config: &mut CashFlowConfig, name: &str, amount: Money) -> CadenceResult<()> {
    if let Some(slot) = config.recurring_weekly.get_mut(name) {
        *slot = amount;
    } else if let Some(slot) = config.recurring_monthly.get_mut(name) {
        *slot = amount;
    } else {
        config.recurring_weekly.insert(name.to_string(), amount);
    }
    Ok(())
}

fn snapshot_str(snapshot: &Value, key: &str) -> CadenceResult<String> {
    snapshot
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CadenceError::Audit(format!("snapshot missing '{key}'")))
}

fn snapshot_i64(snapshot: &Value, key: &str) -> CadenceResult<i64> {
    snapshot
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| CadenceError::Audit(format!("snapshot missing '{key}'")))
}

fn installment_from_snapshot(snapshot: &Value) -> CadenceResult<(String, Installment)> {
    let name = snapshot_str(snapshot, "name")?;
    let date_str = snapshot_str(snapshot, "date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| CadenceError::Audit(format!("bad installment date: {e}")))?;
    let installment = Installment {
        amount: Money::from_cents(snapshot_i64(snapshot, "amount_cents")?),
        date,
        provider: snapshot_str(snapshot, "provider").unwrap_or_default(),
        category: snapshot_str(snapshot, "category").unwrap_or_default(),
    };
    Ok((name, installment))
}
