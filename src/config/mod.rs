//! Configuration for cadence
//!
//! Path resolution, the cash-flow configuration document, and the user
//! profile. The configuration follows a strict load, mutate-in-memory,
//! persist-whole-document cycle per invocation.

pub mod model;
pub mod paths;
pub mod profile;

pub use model::{
    CashFlowConfig, Essentials, GasBudget, Installment, LoopCriterion, LoopDef, Payroll, Provider,
    SettlementRule,
};
pub use paths::CadencePaths;
pub use profile::{Debt, UserProfile};
