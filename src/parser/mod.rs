//! Free-text command parsing
//!
//! Turns instructions like "I paid off my Slate card" or "Lower EarnIn to
//! 300" into a structured intent. Parsing is deterministic pattern and
//! alias matching over a fixed set of phrase families — identical text
//! always yields an identical intent. Unrecognized text is a data
//! outcome (`action = Unknown`, confidence 0), never an error.

pub mod aliases;
pub mod extract;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use aliases::{AliasTable, Lexicon, Resolution};
pub use extract::{extract_amount, extract_date, extract_duration_days};

/// What the user asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentAction {
    Payoff,
    ChangeAmount,
    Defer,
    AddInstallment,
    Cancel,
    Unknown,
}

/// What kind of entity the instruction targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Debt,
    RecurringBill,
    Installment,
    Provider,
    Unknown,
}

/// A structured reading of one free-text instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub action: IntentAction,
    pub entity_kind: EntityKind,
    /// Canonical name of the resolved entity, when resolution succeeded
    pub entity_name: Option<String>,
    /// Extracted parameters (amount in cents, dates, day counts), keyed
    /// deterministically
    pub params: BTreeMap<String, String>,
    /// 0.0 (no match) to 1.0 (exact phrase + exact entity)
    pub confidence: f64,
    /// True when more than one entity matched; the best match is used
    pub ambiguous: bool,
    /// The other candidate entity names, in match order
    pub alternatives: Vec<String>,
}

impl ParsedIntent {
    fn unknown() -> Self {
        Self {
            action: IntentAction::Unknown,
            entity_kind: EntityKind::Unknown,
            entity_name: None,
            params: BTreeMap::new(),
            confidence: 0.0,
            ambiguous: false,
            alternatives: Vec::new(),
        }
    }

    fn with_resolution(mut self, resolution: Option<Resolution>) -> Self {
        if let Some(res) = resolution {
            self.ambiguous = !res.alternatives.is_empty();
            self.alternatives = res.alternatives;
            self.entity_name = Some(res.name);
        }
        self
    }
}

const PAYOFF_PHRASES: &[&str] = &["paid off", "pay off", "payed off", "paying off"];
const CLOSE_WORDS: &[&str] = &["close", "closed"];
const CHANGE_WORDS: &[&str] = &["lower", "change", "set", "update", "raise", "reduce"];
const DEFER_WORDS: &[&str] = &["defer", "postpone", "delay"];
const CANCEL_WORDS: &[&str] = &["cancel", "stop", "end"];
const SCAN_PHRASES: &[&str] = &["paid off", "closed", "finished paying", "done paying"];

fn has_phrase(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| lower.contains(p))
}

fn has_word(lower: &str, words: &[&str]) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

/// Parse one free-text instruction.
///
/// Phrase families are tried in fixed priority order — payoff, change
/// amount, defer, add installment, cancel — and the first family whose
/// requirements are met wins. `today` anchors relative dates.
pub fn parse_command(text: &str, lexicon: &Lexicon, today: NaiveDate) -> ParsedIntent {
    let lower = text.to_lowercase();

    // Payoff / close
    if has_phrase(&lower, PAYOFF_PHRASES) || has_word(&lower, CLOSE_WORDS) {
        let resolution = lexicon.debts.resolve(&lower);
        let confidence = if resolution.is_some() { 0.9 } else { 0.5 };
        return ParsedIntent {
            action: IntentAction::Payoff,
            entity_kind: EntityKind::Debt,
            confidence,
            ..ParsedIntent::unknown()
        }
        .with_resolution(resolution);
    }

    // Change amount: keyword + amount + a recurring-bill alias, all required
    if has_word(&lower, CHANGE_WORDS) {
        if let (Some(amount), Some(resolution)) =
            (extract_amount(&lower), lexicon.bills.resolve(&lower))
        {
            let mut params = BTreeMap::new();
            params.insert("amount_cents".to_string(), amount.cents().to_string());
            if let Some(date) = extract_date(&lower, today) {
                params.insert("effective_date".to_string(), date.to_string());
            }
            let confidence = if resolution.exact { 0.9 } else { 0.85 };
            return ParsedIntent {
                action: IntentAction::ChangeAmount,
                entity_kind: EntityKind::RecurringBill,
                params,
                confidence,
                ..ParsedIntent::unknown()
            }
            .with_resolution(Some(resolution));
        }
    }

    // Defer / postpone / delay
    if has_word(&lower, DEFER_WORDS) || lower.contains("push back") {
        let (kind, resolution) = resolve_any(lexicon, &lower);
        let days = extract_duration_days(&lower).unwrap_or(7);
        let mut params = BTreeMap::new();
        params.insert("days".to_string(), days.to_string());
        let confidence = if resolution.is_some() { 0.8 } else { 0.5 };
        return ParsedIntent {
            action: IntentAction::Defer,
            entity_kind: kind,
            params,
            confidence,
            ..ParsedIntent::unknown()
        }
        .with_resolution(resolution);
    }

    // Add installment: "add" + installment/provider keyword + amount + date
    if has_word(&lower, &["add"]) {
        let provider = lexicon.providers.resolve(&lower);
        let keyword = lower.contains("installment") || provider.is_some();
        if let (true, Some(amount), Some(date)) =
            (keyword, extract_amount(&lower), extract_date(&lower, today))
        {
            let mut params = BTreeMap::new();
            params.insert("amount_cents".to_string(), amount.cents().to_string());
            params.insert("date".to_string(), date.to_string());
            if let Some(res) = &provider {
                params.insert("provider".to_string(), res.name.clone());
            }
            return ParsedIntent {
                action: IntentAction::AddInstallment,
                entity_kind: EntityKind::Installment,
                params,
                confidence: 0.8,
                ..ParsedIntent::unknown()
            }
            .with_resolution(provider);
        }
    }

    // Cancel / stop / end: requires a resolvable entity
    if has_word(&lower, CANCEL_WORDS) {
        let (kind, resolution) = resolve_any(lexicon, &lower);
        if resolution.is_some() {
            return ParsedIntent {
                action: IntentAction::Cancel,
                entity_kind: kind,
                confidence: 0.85,
                ..ParsedIntent::unknown()
            }
            .with_resolution(resolution);
        }
    }

    ParsedIntent::unknown()
}

/// Resolve against bills, then installments, then debts
fn resolve_any(lexicon: &Lexicon, lower: &str) -> (EntityKind, Option<Resolution>) {
    if let Some(res) = lexicon.bills.resolve(lower) {
        return (EntityKind::RecurringBill, Some(res));
    }
    if let Some(res) = lexicon.installments.resolve(lower) {
        return (EntityKind::Installment, Some(res));
    }
    if let Some(res) = lexicon.debts.resolve(lower) {
        return (EntityKind::Debt, Some(res));
    }
    (EntityKind::Unknown, None)
}

/// Scan journal prose for passive payoff phrasing ("paid off X",
/// "closed X", "finished paying X"). Narrower than `parse_command` —
/// used for background change detection, not explicit commands.
pub fn scan_entry_text(text: &str, lexicon: &Lexicon) -> Option<ParsedIntent> {
    let lower = text.to_lowercase();
    if !has_phrase(&lower, SCAN_PHRASES) {
        return None;
    }

    let resolution = lexicon.debts.resolve(&lower)?;
    Some(
        ParsedIntent {
            action: IntentAction::Payoff,
            entity_kind: EntityKind::Debt,
            confidence: 0.7,
            ..ParsedIntent::unknown()
        }
        .with_resolution(Some(resolution)),
    )
}
