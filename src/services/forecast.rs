//! Balance forecasting
//!
//! Day-by-day simulation of the bank balance over a 7-day window, plus the
//! single-day "what can I spend tomorrow" variant. Forecast entries use
//! the same sign convention as recorded events: negative = credit,
//! positive = debit.
//!
//! Composition order within a day is fixed: payday credit, weekly
//! recurring items (via their settlement rules), gas fill, installments
//! due, amortized daily essentials, then recorded events. Settlement
//! rules are consulted from the configuration for every item — no item
//! gets special treatment by name.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{CashFlowConfig, GasBudget, SettlementRule};
use crate::models::{CashFlowEvent, Money};

use super::loops::week_window;

/// What produced a forecast entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Payday,
    Recurring,
    Reserve,
    Clear,
    Gas,
    Installment,
    Essential,
    Recorded,
}

/// One projected or recorded line inside a forecast day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub label: String,
    pub kind: EntryKind,
    /// Signed cents: negative = credit, positive = debit. Zero for
    /// informational entries (a two-stage item's clear day).
    pub amount: Money,
}

impl ForecastEntry {
    fn new(label: impl Into<String>, kind: EntryKind, amount: Money) -> Self {
        Self {
            label: label.into(),
            kind,
            amount,
        }
    }
}

/// One simulated day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub entries: Vec<ForecastEntry>,
    pub ending_bank: Money,
    pub ending_cash: Money,
}

/// Totals across the forecast window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Total credited (positive number)
    pub income: Money,
    /// Total debited (positive number)
    pub expenses: Money,
    /// income - expenses
    pub net: Money,
}

/// The full forecast value object handed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub starting_bank: Money,
    pub starting_cash: Money,
    pub days: Vec<DayForecast>,
    pub summary: ForecastSummary,
}

/// Tomorrow's expected obligations and spending headroom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomorrowBudget {
    pub date: NaiveDate,
    pub expected: Vec<ForecastEntry>,
    /// Total expected debits (positive number)
    pub expected_outflow: Money,
    pub projected_balance: Money,
    /// max(0, projected_balance - safety buffer)
    pub discretionary: Money,
}

/// The earliest date on or after `from` whose weekday matches the
/// configured payday. `from` itself qualifies — payday can be today.
pub fn next_payday(config: &CashFlowConfig, from: NaiveDate) -> NaiveDate {
    let payday = config.payroll.payday;
    let offset = (payday.num_days_from_monday() + 7 - from.weekday().num_days_from_monday()) % 7;
    from + Duration::days(i64::from(offset))
}

/// Enumerate gas fill dates spaced by the configured interval, starting at
/// `start`, inclusive of `end`. Empty when no fill cost is configured.
pub fn gas_fill_schedule(start: NaiveDate, end: NaiveDate, gas: &GasBudget) -> Vec<(NaiveDate, Money)> {
    if gas.cost_per_fill.is_zero() || start > end {
        return Vec::new();
    }

    let mut fills = Vec::new();
    let mut day = start;
    while day <= end {
        fills.push((day, gas.cost_per_fill));
        day += Duration::days(i64::from(gas.fill_interval_days));
    }
    fills
}

/// Collect the projected entries for one day, in the fixed composition
/// order. Recorded events are appended by the callers that apply them.
fn planned_entries_for_day(
    config: &CashFlowConfig,
    day: NaiveDate,
    payday_date: NaiveDate,
    gas_fills: &[(NaiveDate, Money)],
) -> Vec<ForecastEntry> {
    let mut entries = Vec::new();

    // 1. Payday
    if day == payday_date && !config.payroll.net_pay.is_zero() {
        entries.push(ForecastEntry::new(
            "Payday",
            EntryKind::Payday,
            -config.payroll.net_pay,
        ));
    }

    // 2. Weekly recurring items, each through its settlement rule. An item
    // with no rule posts single-day on the payroll payday.
    let default_rule = SettlementRule {
        reserve_day: config.payroll.payday,
        clear_day: None,
        reserve_account: None,
        two_stage: false,
    };
    for (name, amount) in &config.recurring_weekly {
        let rule = config.rule_for(name).unwrap_or(&default_rule);
        if rule.two_stage {
            if day.weekday() == rule.reserve_day {
                entries.push(ForecastEntry::new(
                    format!("{name} (reserve)"),
                    EntryKind::Reserve,
                    *amount,
                ));
            }
            if Some(day.weekday()) == rule.clear_day {
                // Money already left on the reserve day; zero impact here
                entries.push(ForecastEntry::new(
                    format!("{name} (clears)"),
                    EntryKind::Clear,
                    Money::zero(),
                ));
            }
        } else if day.weekday() == rule.reserve_day {
            entries.push(ForecastEntry::new(name.clone(), EntryKind::Recurring, *amount));
        }
    }

    // 3. Gas fill
    if let Some((_, cost)) = gas_fills.iter().find(|(d, _)| *d == day) {
        entries.push(ForecastEntry::new("Gas fill", EntryKind::Gas, *cost));
    }

    // 3b. Installments due today
    for (name, installment) in &config.installments {
        if installment.date == day {
            entries.push(ForecastEntry::new(
                format!("Installment: {name}"),
                EntryKind::Installment,
                installment.amount,
            ));
        }
    }

    // 4. Amortized daily essentials
    let daily_essential = config.essentials.weekly_total().div(7);
    if !daily_essential.is_zero() {
        entries.push(ForecastEntry::new(
            "Essentials (daily)",
            EntryKind::Essential,
            daily_essential,
        ));
    }

    entries
}

fn summarize(days: &[DayForecast]) -> ForecastSummary {
    let mut income = Money::zero();
    let mut expenses = Money::zero();
    for day in days {
        for entry in &day.entries {
            if entry.amount.is_negative() {
                income += -entry.amount;
            } else {
                expenses += entry.amount;
            }
        }
    }
    ForecastSummary {
        income,
        expenses,
        net: income - expenses,
    }
}

/// Simulate the 7 days starting at `start_date`.
///
/// `events` should hold the recorded events for the window; each one is
/// applied on its date by its signed amount. The cash balance is carried
/// through unchanged — no recurring cash-only rules are modeled.
pub fn forecast_week(
    config: &CashFlowConfig,
    events: &[CashFlowEvent],
    start_date: NaiveDate,
    starting_bank: Money,
    starting_cash: Money,
) -> ForecastResult {
    let end_date = start_date + Duration::days(6);
    let payday_date = next_payday(config, start_date);
    let gas_fills = gas_fill_schedule(start_date, end_date, &config.essentials.gas);

    let mut bank = starting_bank;
    let mut days = Vec::with_capacity(7);

    for day_index in 0..7 {
        let day = start_date + Duration::days(day_index);
        let mut entries = planned_entries_for_day(config, day, payday_date, &gas_fills);

        // 5. Recorded events dated today
        for event in events.iter().filter(|e| e.date == day) {
            let label = event
                .memo
                .clone()
                .or_else(|| event.provider.clone())
                .unwrap_or_else(|| event.kind.to_string());
            entries.push(ForecastEntry::new(label, EntryKind::Recorded, event.amount));
        }

        for entry in &entries {
            bank -= entry.amount;
        }

        days.push(DayForecast {
            date: day,
            entries,
            ending_bank: bank,
            ending_cash: starting_cash,
        });
    }

    let summary = summarize(&days);
    ForecastResult {
        start: start_date,
        end: end_date,
        starting_bank,
        starting_cash,
        days,
        summary,
    }
}

/// Whether a gas fill falls due on `date`.
///
/// Anchored on the most recent recorded gas fill when one exists, else on
/// the interval schedule from the start of `date`'s week.
fn gas_due_on(config: &CashFlowConfig, events: &[CashFlowEvent], date: NaiveDate) -> bool {
    let gas = &config.essentials.gas;
    if gas.cost_per_fill.is_zero() {
        return false;
    }

    let last_fill = events
        .iter()
        .filter(|e| e.is_outflow() && e.category.as_deref() == Some("gas") && e.date < date)
        .map(|e| e.date)
        .max();

    match last_fill {
        Some(last) => (date - last).num_days() >= i64::from(gas.fill_interval_days),
        None => {
            let (week_start, _) = week_window(date, config.payroll.week_start);
            gas_fill_schedule(week_start, date, gas)
                .iter()
                .any(|(d, _)| *d == date)
        }
    }
}

/// Single-day projection for the day after `today`: expected obligations,
/// projected end balance, and the discretionary estimate above the
/// configured safety buffer.
pub fn tomorrow_budget(
    config: &CashFlowConfig,
    events: &[CashFlowEvent],
    today: NaiveDate,
    today_balance: Money,
) -> TomorrowBudget {
    let date = today + Duration::days(1);
    let payday_date = next_payday(config, date);

    let gas_fills = if gas_due_on(config, events, date) {
        vec![(date, config.essentials.gas.cost_per_fill)]
    } else {
        Vec::new()
    };

    let expected = planned_entries_for_day(config, date, payday_date, &gas_fills);

    let expected_outflow: Money = expected
        .iter()
        .filter(|e| e.amount.is_positive())
        .map(|e| e.amount)
        .sum();

    let projected_balance = expected
        .iter()
        .fold(today_balance, |balance, entry| balance - entry.amount);

    let discretionary = (projected_balance - config.safety_buffer).max(Money::zero());

    TomorrowBudget {
        date,
        expected,
        expected_outflow,
        projected_balance,
        discretionary,
    }
}
