//! Cash-flow event model
//!
//! A `CashFlowEvent` is one recorded movement of money: a paycheck, a bill
//! payment, a cash-advance draw, a repayment. Events are immutable once
//! recorded — corrections are new events, never in-place edits.
//!
//! Sign convention: the amount is signed cents where NEGATIVE is an inflow
//! (money arriving) and POSITIVE is an outflow (money leaving). The
//! forecaster and loop analytics both rely on this convention.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;
use crate::error::CadenceError;

/// The kind of cash movement an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Income,
    Bill,
    Transfer,
    Spend,
    Advance,
    Repayment,
    Fee,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Income => "income",
            EventType::Bill => "bill",
            EventType::Transfer => "transfer",
            EventType::Spend => "spend",
            EventType::Advance => "advance",
            EventType::Repayment => "repayment",
            EventType::Fee => "fee",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EventType {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(EventType::Income),
            "bill" => Ok(EventType::Bill),
            "transfer" => Ok(EventType::Transfer),
            "spend" => Ok(EventType::Spend),
            "advance" => Ok(EventType::Advance),
            "repayment" => Ok(EventType::Repayment),
            "fee" => Ok(EventType::Fee),
            other => Err(CadenceError::Parse(format!("unknown event type: {other}"))),
        }
    }
}

/// One recorded cash-flow event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEvent {
    /// Date the money moved
    pub date: NaiveDate,

    /// What kind of movement this was
    pub kind: EventType,

    /// Provider label, e.g. the cash-advance product or biller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Spending category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Account label the movement hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Free-form memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Signed amount in cents: negative = inflow, positive = outflow
    pub amount: Money,
}

impl CashFlowEvent {
    /// Create an event with the required fields
    pub fn new(date: NaiveDate, kind: EventType, amount: Money) -> Self {
        Self {
            date,
            kind,
            provider: None,
            category: None,
            account: None,
            memo: None,
            amount,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Money arriving (negative signed amount)
    pub fn is_inflow(&self) -> bool {
        self.amount.is_negative()
    }

    /// Money leaving (positive signed amount)
    pub fn is_outflow(&self) -> bool {
        self.amount.is_positive()
    }
}
