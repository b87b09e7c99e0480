//! Amount and date extraction from free text
//!
//! A deliberately small vocabulary: dollar-sign amounts, "N dollars"
//! phrasing, bare decimals; ISO dates, "tomorrow", and "next week".
//! Anything else is simply absent, never an error.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Money;

static DOLLAR_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").unwrap());

static WORD_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([0-9][0-9,]*(?:\.[0-9]{1,2})?)\s*(?:dollars|bucks|usd)\b").unwrap()
});

static BARE_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9][0-9,]*(?:\.[0-9]{1,2})?)\b").unwrap());

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap());

/// Pull the first monetary amount out of the text.
///
/// Tries `$1,234.56`, then `1234.56 dollars`, then a bare decimal number.
pub fn extract_amount(text: &str) -> Option<Money> {
    for pattern in [&*DOLLAR_AMOUNT, &*WORD_AMOUNT, &*BARE_AMOUNT] {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(amount) = Money::parse(&caps[1]) {
                return Some(amount);
            }
        }
    }
    None
}

/// Pull a date out of the text, relative to `today` for the fixed
/// phrases. Explicit ISO dates win; "next week" is +7 days, "tomorrow"
/// is +1 day; anything else yields no date.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
            return Some(date);
        }
    }

    let lower = text.to_lowercase();
    if lower.contains("next week") {
        return Some(today + Duration::days(7));
    }
    if lower.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }

    None
}

/// Pull a day-count duration ("in 10 days", "for 3 days") out of the
/// text. "a week" and "next week" read as 7.
pub fn extract_duration_days(text: &str) -> Option<u32> {
    static DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*days?\b").unwrap());

    if let Some(caps) = DAYS.captures(text) {
        return caps[1].parse().ok();
    }
    let lower = text.to_lowercase();
    if lower.contains("a week") || lower.contains("next week") || lower.contains("one week") {
        return Some(7);
    }
    None
}
