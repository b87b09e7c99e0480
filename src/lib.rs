//! cadence - cash-flow forecasting and plain-English budget adjustments
//!
//! cadence models a person's recurring income, bills, and cash-advance
//! loops, projects near-term balances day by day, and accepts free-text
//! instructions ("I paid off my Slate card", "Lower EarnIn to 300") that
//! mutate the model safely with a full audit trail and revert path.
//!
//! # Architecture
//!
//! - `config`: paths, the cash-flow configuration document, the profile
//! - `error`: the crate-wide error type
//! - `models`: money and cash-flow events
//! - `storage`: atomic document I/O and the event store
//! - `parser`: free-text command parsing with injected alias tables
//! - `services`: loop analytics, forecasting, the adjustment pipeline
//! - `audit`: immutable audit records with a revert path
//! - `display`: terminal rendering (the cents -> dollars boundary)
//! - `cli`: clap command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use cadence::config::{CadencePaths, CashFlowConfig, UserProfile};
//! use cadence::parser::{parse_command, Lexicon};
//!
//! let paths = CadencePaths::new()?;
//! let config = CashFlowConfig::load(&paths.config_file())?;
//! let profile = UserProfile::load(&paths.profile_file())?;
//! let lexicon = Lexicon::from_sources(&config, &profile);
//! let intent = parse_command("Lower EarnIn to 300", &lexicon, today);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod parser;
pub mod services;
pub mod storage;

pub use error::{CadenceError, CadenceResult};
