//! Business logic for cadence
//!
//! Read-only engines (loop analytics, forecasting) and the adjustment
//! pipeline that mutates the configuration model under audit.

pub mod adjustment;
pub mod forecast;
pub mod import;
pub mod loops;

pub use adjustment::{apply_adjustment, create_diff, AdjustmentDiff};
pub use forecast::{
    forecast_week, gas_fill_schedule, next_payday, tomorrow_budget, DayForecast, ForecastResult,
    ForecastSummary, TomorrowBudget,
};
pub use import::{import_events, ImportResult};
pub use loops::{
    balance_with_or_without_loop, is_in_loop, loop_delta, loop_strain, summarize_loops,
    week_window, weeks_without_loop, DeltaDirection, LoopDelta, LoopSummary, StreakReport,
};
