//! Loop analytics
//!
//! A loop is a named recurring draw/repay relationship (typically a
//! cash-advance product). This module measures dependency on loops:
//! per-period summaries, week-over-week deltas, non-usage streaks, and
//! the balance replay that isolates how much strain a loop is masking.
//!
//! Everything here is a pure function over event slices; callers query
//! the event store for the range they care about first.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::LoopDef;
use crate::models::{CashFlowEvent, Money};

/// The 7-day window containing `date`, anchored so the start falls on
/// `week_start`. Idempotent: any date inside the returned window maps
/// back to the same window.
pub fn week_window(date: NaiveDate, week_start: Weekday) -> (NaiveDate, NaiveDate) {
    let offset = (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    let start = date - Duration::days(i64::from(offset));
    (start, start + Duration::days(6))
}

/// Whether an event matches any of the loop's criteria.
///
/// A criterion matches when the event type is equal and either the
/// criterion names no provider or the event's provider equals it.
pub fn is_in_loop(event: &CashFlowEvent, loop_def: &LoopDef) -> bool {
    loop_def.includes.iter().any(|criterion| {
        if event.kind != criterion.event_type {
            return false;
        }
        match &criterion.provider {
            None => true,
            Some(wanted) => event
                .provider
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(wanted)),
        }
    })
}

/// Per-loop, per-period summary of matched events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSummary {
    /// The events that matched the loop's criteria
    pub events: Vec<CashFlowEvent>,
    /// Sum of negative (inflow) amounts; always <= 0
    pub inflow: Money,
    /// Sum of positive (outflow) amounts; always >= 0
    pub outflow: Money,
    /// inflow + outflow, equal to the sum of matched signed amounts
    pub net: Money,
    /// Whether any event matched in the period
    pub used: bool,
}

/// Summarize a period's events against each loop, keyed by loop name
pub fn summarize_loops(
    events: &[CashFlowEvent],
    loops: &[LoopDef],
) -> std::collections::BTreeMap<String, LoopSummary> {
    loops
        .iter()
        .map(|loop_def| {
            let matched: Vec<CashFlowEvent> = events
                .iter()
                .filter(|e| is_in_loop(e, loop_def))
                .cloned()
                .collect();

            let inflow: Money = matched
                .iter()
                .filter(|e| e.is_inflow())
                .map(|e| e.amount)
                .sum();
            let outflow: Money = matched
                .iter()
                .filter(|e| e.is_outflow())
                .map(|e| e.amount)
                .sum();

            let summary = LoopSummary {
                used: !matched.is_empty(),
                net: inflow + outflow,
                inflow,
                outflow,
                events: matched,
            };
            (loop_def.name.clone(), summary)
        })
        .collect()
}

/// Direction of a period-over-period change in loop net
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaDirection {
    Increase,
    Decrease,
    Same,
}

/// Signed change in a loop's net total between two periods
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoopDelta {
    pub delta: Money,
    pub direction: DeltaDirection,
}

/// Compare a loop's net totals across two periods.
///
/// `Same` only on exact equality of the nets.
pub fn loop_delta(
    current_period: &[CashFlowEvent],
    prior_period: &[CashFlowEvent],
    loop_def: &LoopDef,
) -> LoopDelta {
    let net_of = |events: &[CashFlowEvent]| -> Money {
        events
            .iter()
            .filter(|e| is_in_loop(e, loop_def))
            .map(|e| e.amount)
            .sum()
    };

    let delta = net_of(current_period) - net_of(prior_period);
    let direction = if delta.is_positive() {
        DeltaDirection::Increase
    } else if delta.is_negative() {
        DeltaDirection::Decrease
    } else {
        DeltaDirection::Same
    };

    LoopDelta { delta, direction }
}

/// Non-usage streaks for a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakReport {
    /// Consecutive trailing weeks with zero usage, counted back from the
    /// reference week and stopping at the first used week
    pub current_streak: u32,
    /// Longest zero-usage run anywhere in the lookback window
    pub best_streak: u32,
}

/// Walk backward week-by-week from `end_date` and count zero-usage weeks.
///
/// `events` should cover the full lookback range (`max_weeks` weeks back
/// from `end_date`'s window).
pub fn weeks_without_loop(
    events: &[CashFlowEvent],
    loop_def: &LoopDef,
    end_date: NaiveDate,
    max_weeks: u32,
    week_start: Weekday,
) -> StreakReport {
    let mut current_streak = 0u32;
    let mut current_run_open = true;

    let mut best_streak = 0u32;
    let mut run = 0u32;

    for week_index in 0..max_weeks {
        let probe = end_date - Duration::days(i64::from(week_index) * 7);
        let (start, end) = week_window(probe, week_start);

        let used = events
            .iter()
            .any(|e| e.date >= start && e.date <= end && is_in_loop(e, loop_def));

        if used {
            current_run_open = false;
            run = 0;
        } else {
            if current_run_open {
                current_streak += 1;
            }
            run += 1;
            best_streak = best_streak.max(run);
        }
    }

    StreakReport {
        current_streak,
        best_streak,
    }
}

/// Replay events into a running balance, optionally excluding the loop's
/// inflows.
///
/// With `include_loop = false`, loop inflow events are dropped from the
/// replay — isolating the strain the loop is masking — while loop
/// outflows (repayments, fees) still count.
pub fn balance_with_or_without_loop(
    events: &[CashFlowEvent],
    loop_def: &LoopDef,
    starting_balance: Money,
    include_loop: bool,
) -> Money {
    events.iter().fold(starting_balance, |balance, event| {
        if !include_loop && event.is_inflow() && is_in_loop(event, loop_def) {
            return balance;
        }
        // Signed amounts: outflow-positive subtracts, inflow-negative adds
        balance - event.amount
    })
}

/// The portion of a period's net change attributable to loop usage:
/// with-loop replay minus without-loop replay.
pub fn loop_strain(events: &[CashFlowEvent], loop_def: &LoopDef, starting_balance: Money) -> Money {
    let with = balance_with_or_without_loop(events, loop_def, starting_balance, true);
    let without = balance_with_or_without_loop(events, loop_def, starting_balance, false);
    with - without
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoopCriterion;
    use crate::models::EventType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn earnin_loop() -> LoopDef {
        LoopDef {
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
        }
    }

    fn draw(d: NaiveDate, cents: i64) -> CashFlowEvent {
        CashFlowEvent::new(d, EventType::Advance, Money::from_cents(cents)).with_provider("EarnIn")
    }

    fn repay(d: NaiveDate, cents: i64) -> CashFlowEvent {
        CashFlowEvent::new(d, EventType::Repayment, Money::from_cents(cents))
            .with_provider("EarnIn")
    }

    #[test]
    fn test_week_window_anchoring() {
        // 2025-06-11 is a Wednesday; Fri-anchored week is Jun 6..=Jun 12
        let (start, end) = week_window(date(2025, 6, 11), Weekday::Fri);
        assert_eq!(start, date(2025, 6, 6));
        assert_eq!(end, date(2025, 6, 12));
        assert_eq!(start.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_week_window_idempotent() {
        let (start, end) = week_window(date(2025, 6, 11), Weekday::Fri);
        let mut day = start;
        while day <= end {
            assert_eq!(week_window(day, Weekday::Fri), (start, end));
            day += Duration::days(1);
        }
    }

    #[test]
    fn test_week_window_on_anchor_day() {
        // A date already on the anchor weekday starts its own window
        let (start, _) = week_window(date(2025, 6, 6), Weekday::Fri);
        assert_eq!(start, date(2025, 6, 6));
    }

    #[test]
    fn test_is_in_loop_provider_matching() {
        let loop_def = earnin_loop();
        assert!(is_in_loop(&draw(date(2025, 6, 2), -30_000), &loop_def));

        let other = CashFlowEvent::new(date(2025, 6, 2), EventType::Advance, Money::from_cents(-30_000))
            .with_provider("Klover");
        assert!(!is_in_loop(&other, &loop_def));

        let no_provider =
            CashFlowEvent::new(date(2025, 6, 2), EventType::Advance, Money::from_cents(-30_000));
        assert!(!is_in_loop(&no_provider, &loop_def));
    }

    #[test]
    fn test_is_in_loop_open_criterion_matches_any_provider() {
        let loop_def = LoopDef {
            name: "any-advance".into(),
            includes: vec![LoopCriterion {
                event_type: EventType::Advance,
                provider: None,
            }],
        };
        let event =
            CashFlowEvent::new(date(2025, 6, 2), EventType::Advance, Money::from_cents(-100))
                .with_provider("Klover");
        assert!(is_in_loop(&event, &loop_def));
    }

    #[test]
    fn test_summarize_loops_totals() {
        let loop_def = earnin_loop();
        let events = vec![
            draw(date(2025, 6, 2), -30_000),
            repay(date(2025, 6, 5), 30_500),
            CashFlowEvent::new(date(2025, 6, 3), EventType::Spend, Money::from_cents(1200)),
        ];

        let summaries = summarize_loops(&events, std::slice::from_ref(&loop_def));
        let summary = &summaries["earnin"];

        assert!(summary.used);
        assert_eq!(summary.events.len(), 2);
        assert_eq!(summary.inflow.cents(), -30_000);
        assert_eq!(summary.outflow.cents(), 30_500);
        assert_eq!(summary.net, summary.inflow + summary.outflow);
        assert_eq!(summary.net.cents(), 500);

        // Invariants: inflow <= 0, outflow >= 0, net == sum of signed amounts
        assert!(summary.inflow.cents() <= 0);
        assert!(summary.outflow.cents() >= 0);
        let signed_sum: Money = summary.events.iter().map(|e| e.amount).sum();
        assert_eq!(summary.net, signed_sum);
    }

    #[test]
    fn test_summarize_unused_loop() {
        let loop_def = earnin_loop();
        let events = vec![CashFlowEvent::new(
            date(2025, 6, 3),
            EventType::Spend,
            Money::from_cents(1200),
        )];
        let summaries = summarize_loops(&events, std::slice::from_ref(&loop_def));
        let summary = &summaries["earnin"];
        assert!(!summary.used);
        assert!(summary.net.is_zero());
    }

    #[test]
    fn test_loop_delta_directions() {
        let loop_def = earnin_loop();
        let week1 = vec![draw(date(2025, 6, 2), -30_000), repay(date(2025, 6, 5), 30_000)];
        let week2 = vec![draw(date(2025, 6, 9), -30_000), repay(date(2025, 6, 12), 32_000)];

        let delta = loop_delta(&week2, &week1, &loop_def);
        assert_eq!(delta.delta.cents(), 2000);
        assert_eq!(delta.direction, DeltaDirection::Increase);

        let delta = loop_delta(&week1, &week2, &loop_def);
        assert_eq!(delta.direction, DeltaDirection::Decrease);

        let delta = loop_delta(&week1, &week1, &loop_def);
        assert_eq!(delta.delta, Money::zero());
        assert_eq!(delta.direction, DeltaDirection::Same);
    }

    #[test]
    fn test_streaks_clean_then_used() {
        // 3 clean weeks, then a used week further back. Fri-anchored weeks.
        let loop_def = earnin_loop();
        let end = date(2025, 6, 26); // Thursday, in week Jun 20..=26
        let usage = vec![draw(date(2025, 6, 2), -30_000)]; // week May 30..=Jun 5

        let report = weeks_without_loop(&usage, &loop_def, end, 8, Weekday::Fri);
        assert_eq!(report.current_streak, 3);
        // Remaining lookback weeks before the usage are also clean
        assert_eq!(report.best_streak, 4);
    }

    #[test]
    fn test_streaks_usage_in_current_week() {
        // Usage in the most recent week zeroes the current streak but the
        // best streak still finds the older clean run.
        let loop_def = earnin_loop();
        let end = date(2025, 6, 26);
        let usage = vec![draw(date(2025, 6, 24), -30_000)]; // current week

        let report = weeks_without_loop(&usage, &loop_def, end, 4, Weekday::Fri);
        assert_eq!(report.current_streak, 0);
        assert_eq!(report.best_streak, 3);
    }

    #[test]
    fn test_streak_scenario_three_clean_weeks() {
        // 3 consecutive zero-usage weeks followed by one used week.
        // Evaluated from inside the used week the current streak is 0;
        // evaluated at the end of the clean run it is 3.
        let loop_def = earnin_loop();
        // Used week: Jun 20..=26. Clean weeks: May 30..=Jun 19.
        let usage = vec![draw(date(2025, 6, 24), -30_000)];

        let in_used_week = weeks_without_loop(&usage, &loop_def, date(2025, 6, 26), 4, Weekday::Fri);
        assert_eq!(in_used_week.current_streak, 0);
        assert_eq!(in_used_week.best_streak, 3);

        let at_clean_end = weeks_without_loop(&usage, &loop_def, date(2025, 6, 19), 3, Weekday::Fri);
        assert_eq!(at_clean_end.current_streak, 3);
        assert_eq!(at_clean_end.best_streak, 3);
    }

    #[test]
    fn test_balance_replay_with_and_without_loop() {
        let loop_def = earnin_loop();
        let events = vec![
            draw(date(2025, 6, 2), -30_000),   // +$300 inflow from the loop
            repay(date(2025, 6, 5), 30_500),   // -$305 repayment
            CashFlowEvent::new(date(2025, 6, 3), EventType::Spend, Money::from_cents(10_000)),
        ];
        let start = Money::from_dollars(500);

        let with = balance_with_or_without_loop(&events, &loop_def, start, true);
        assert_eq!(with.cents(), 50_000 + 30_000 - 30_500 - 10_000);

        // Without the loop inflow, only the repayment and spend count
        let without = balance_with_or_without_loop(&events, &loop_def, start, false);
        assert_eq!(without.cents(), 50_000 - 30_500 - 10_000);

        assert_eq!(loop_strain(&events, &loop_def, start).cents(), 30_000);
    }
}
