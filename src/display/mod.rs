//! Terminal display formatting
//!
//! The only place cents become decimal dollars. Tables for the forecast,
//! loop summaries, and the audit list; hand-formatted detail views for
//! diffs and the tomorrow budget.

use std::collections::BTreeMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::AuditRecord;
use crate::models::Money;
use crate::services::adjustment::AdjustmentDiff;
use crate::services::forecast::{ForecastResult, TomorrowBudget};
use crate::services::loops::LoopSummary;

/// Signed entry amounts render as +$x.xx for credits
fn signed(amount: Money) -> String {
    if amount.is_negative() {
        format!("+{}", -amount)
    } else {
        amount.to_string()
    }
}

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Bank")]
    bank: String,
}

/// Render a week forecast as a table, one row per entry plus a row for
/// quiet days
pub fn forecast_table(result: &ForecastResult) -> String {
    let mut rows = Vec::new();
    for day in &result.days {
        let date = day.date.format("%a %m-%d").to_string();
        if day.entries.is_empty() {
            rows.push(ForecastRow {
                date,
                entry: "-".into(),
                amount: "-".into(),
                bank: day.ending_bank.to_string(),
            });
            continue;
        }
        for (i, entry) in day.entries.iter().enumerate() {
            rows.push(ForecastRow {
                date: if i == 0 { date.clone() } else { String::new() },
                entry: entry.label.clone(),
                amount: signed(entry.amount),
                bank: if i == day.entries.len() - 1 {
                    day.ending_bank.to_string()
                } else {
                    String::new()
                },
            });
        }
    }

    let mut output = Table::new(rows).with(Style::sharp()).to_string();
    output.push('\n');
    output.push_str(&format!(
        "Income {} | Expenses {} | Net {}\n",
        result.summary.income, result.summary.expenses, result.summary.net
    ));
    output
}

#[derive(Tabled)]
struct LoopRow {
    #[tabled(rename = "Loop")]
    name: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Inflow")]
    inflow: String,
    #[tabled(rename = "Outflow")]
    outflow: String,
    #[tabled(rename = "Net")]
    net: String,
}

/// Render per-loop summaries as a table
pub fn loops_table(summaries: &BTreeMap<String, LoopSummary>) -> String {
    let rows: Vec<LoopRow> = summaries
        .iter()
        .map(|(name, s)| LoopRow {
            name: name.clone(),
            used: if s.used { "yes" } else { "no" }.into(),
            inflow: s.inflow.to_string(),
            outflow: s.outflow.to_string(),
            net: s.net.to_string(),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "Audit id")]
    id: String,
    #[tabled(rename = "When (UTC)")]
    when: String,
    #[tabled(rename = "Entities")]
    entities: String,
    #[tabled(rename = "Changes")]
    changes: usize,
}

/// Render the audit history as a table, oldest first
pub fn audits_table(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No audit records.\n".to_string();
    }
    let rows: Vec<AuditRow> = records
        .iter()
        .map(|r| AuditRow {
            id: r.audit_id.clone(),
            when: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entities: r.resolved_entities.join(", "),
            changes: r.changes_applied.len(),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Format a proposed diff for confirmation
pub fn format_diff(diff: &AdjustmentDiff) -> String {
    let mut output = String::new();

    output.push_str("Proposed changes:\n");
    if diff.changes.is_empty() {
        output.push_str("  (none)\n");
    }
    for change in &diff.changes {
        output.push_str(&format!("  - {change}\n"));
    }

    for warning in &diff.warnings {
        output.push_str(&format!("  ! {warning}\n"));
    }

    if !diff.safe {
        output.push_str("Not safe to apply.\n");
    }

    output
}

/// Format the tomorrow budget summary
pub fn format_tomorrow(budget: &TomorrowBudget) -> String {
    let mut output = String::new();
    output.push_str(&format!("Tomorrow ({}):\n", budget.date));

    if budget.expected.is_empty() {
        output.push_str("  No expected obligations.\n");
    }
    for entry in &budget.expected {
        output.push_str(&format!("  {:24} {:>12}\n", entry.label, signed(entry.amount)));
    }

    output.push_str(&format!("Expected outflow:  {}\n", budget.expected_outflow));
    output.push_str(&format!("Projected balance: {}\n", budget.projected_balance));
    output.push_str(&format!("Safe to spend:     {}\n", budget.discretionary));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CashFlowConfig, Payroll};
    use crate::services::forecast::forecast_week;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn test_forecast_table_renders() {
        let config = CashFlowConfig {
            payroll: Payroll {
                payday: Weekday::Thu,
                net_pay: Money::from_dollars(600),
                week_start: Weekday::Fri,
            },
            ..CashFlowConfig::default()
        };
        let result = forecast_week(
            &config,
            &[],
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            Money::from_dollars(1000),
            Money::zero(),
        );

        let table = forecast_table(&result);
        assert!(table.contains("Payday"));
        assert!(table.contains("+$600.00"));
        assert!(table.contains("Income $600.00"));
    }

    #[test]
    fn test_signed_formatting() {
        assert_eq!(signed(Money::from_cents(-1050)), "+$10.50");
        assert_eq!(signed(Money::from_cents(1050)), "$10.50");
    }
}
