//! CLI command handlers
//!
//! Bridges clap argument parsing to the service layer. This layer owns
//! the load -> mutate -> persist cycle and the confirmation step: an
//! adjustment is only applied when the user passed `--yes`.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::audit::AuditStore;
use crate::config::{CadencePaths, CashFlowConfig, UserProfile};
use crate::display;
use crate::error::{CadenceError, CadenceResult};
use crate::models::{CashFlowEvent, EventType, Money};
use crate::parser::{parse_command, Lexicon};
use crate::services::adjustment::{apply_adjustment, create_diff};
use crate::services::forecast::{forecast_week, tomorrow_budget};
use crate::services::import::import_events;
use crate::services::loops::{summarize_loops, week_window, weeks_without_loop};
use crate::storage::{EventFilter, EventStore, JsonEventStore};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value by dotted key (e.g. payroll.net_pay)
    Set { key: String, value: String },
    /// Print the current configuration document
    Show,
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// Record one cash-flow event
    Add {
        /// Event date (YYYY-MM-DD)
        date: NaiveDate,
        /// Event type: income|bill|transfer|spend|advance|repayment|fee
        kind: String,
        /// Signed decimal dollars; negative = inflow
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Bulk-import events from a CSV file
    Import { path: std::path::PathBuf },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Initialize the data directory with default documents
pub fn handle_init(paths: &CadencePaths) -> CadenceResult<()> {
    paths.ensure_directories()?;

    if paths.is_initialized() {
        println!("Already initialized at {}", paths.base_dir().display());
        return Ok(());
    }

    CashFlowConfig::default().save(&paths.config_file())?;
    UserProfile::default().save(&paths.profile_file())?;
    println!("Initialized cadence data in {}", paths.base_dir().display());
    Ok(())
}

pub fn handle_config_command(paths: &CadencePaths, command: ConfigCommands) -> CadenceResult<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = CashFlowConfig::load(&paths.config_file())?;
            config.set_key(&key, &value)?;
            config.validate()?;
            config.save(&paths.config_file())?;
            println!("{key} = {value}");
        }
        ConfigCommands::Show => {
            let config = CashFlowConfig::load(&paths.config_file())?;
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }
    Ok(())
}

pub fn handle_event_command(paths: &CadencePaths, command: EventCommands) -> CadenceResult<()> {
    let mut store = JsonEventStore::open(paths.events_file())?;

    match command {
        EventCommands::Add {
            date,
            kind,
            amount,
            provider,
            category,
            account,
            memo,
        } => {
            let kind: EventType = kind.parse()?;
            let mut event = CashFlowEvent::new(date, kind, Money::parse(&amount)?);
            event.provider = provider;
            event.category = category;
            event.account = account;
            event.memo = memo;
            store.insert(event)?;
            println!("Recorded {kind} on {date}");
        }
        EventCommands::Import { path } => {
            let result = import_events(&path, &mut store)?;
            println!("Imported {} events", result.imported);
            for (row, reason) in &result.skipped {
                println!("  skipped row {row}: {reason}");
            }
        }
    }
    Ok(())
}

/// Run the 7-day forecast starting at `start` (default: today)
pub fn handle_forecast(
    paths: &CadencePaths,
    start: Option<NaiveDate>,
    bank: String,
    cash: Option<String>,
) -> CadenceResult<()> {
    let config = CashFlowConfig::load(&paths.config_file())?;
    let store = JsonEventStore::open(paths.events_file())?;

    let start = start.unwrap_or_else(today);
    let end = start + chrono::Duration::days(6);
    let events = store.query(start, end, &EventFilter::any())?;

    let starting_bank = Money::parse(&bank)?;
    let starting_cash = cash.as_deref().map(Money::parse).transpose()?.unwrap_or_default();

    let result = forecast_week(&config, &events, start, starting_bank, starting_cash);
    print!("{}", display::forecast_table(&result));
    Ok(())
}

/// Project tomorrow's obligations and spending headroom
pub fn handle_tomorrow(paths: &CadencePaths, balance: String) -> CadenceResult<()> {
    let config = CashFlowConfig::load(&paths.config_file())?;
    let store = JsonEventStore::open(paths.events_file())?;

    let now = today();
    // Look back far enough to anchor the gas schedule
    let lookback = now - chrono::Duration::days(30);
    let events = store.query(lookback, now, &EventFilter::any())?;

    let budget = tomorrow_budget(&config, &events, now, Money::parse(&balance)?);
    print!("{}", display::format_tomorrow(&budget));
    Ok(())
}

/// Summarize loop usage for the current week, or report a streak
pub fn handle_loops(paths: &CadencePaths, streak: Option<String>, weeks: u32) -> CadenceResult<()> {
    let config = CashFlowConfig::load(&paths.config_file())?;
    let store = JsonEventStore::open(paths.events_file())?;

    let now = today();
    let week_start = config.payroll.week_start;

    if let Some(loop_name) = streak {
        let loop_def = config
            .loop_named(&loop_name)
            .ok_or_else(|| CadenceError::loop_not_found(&loop_name))?;

        let lookback_start =
            week_window(now - chrono::Duration::days(i64::from(weeks) * 7), week_start).0;
        let events = store.query(lookback_start, now, &EventFilter::any())?;

        let report = weeks_without_loop(&events, loop_def, now, weeks, week_start);
        println!(
            "{}: {} week(s) clean now, best run {} week(s) in the last {weeks}",
            loop_def.name, report.current_streak, report.best_streak
        );
        return Ok(());
    }

    let (start, end) = week_window(now, week_start);
    let events = store.query(start, end, &EventFilter::any())?;
    let summaries = summarize_loops(&events, &config.loops);
    if summaries.is_empty() {
        println!("No loops configured.");
    } else {
        println!("Week {start} to {end}");
        print!("{}", display::loops_table(&summaries));
    }
    Ok(())
}

/// Parse a free-text instruction, show the diff, and apply it when
/// confirmed with `--yes`
pub fn handle_adjust(paths: &CadencePaths, text: &str, confirmed: bool) -> CadenceResult<()> {
    let mut config = CashFlowConfig::load(&paths.config_file())?;
    let mut profile = UserProfile::load(&paths.profile_file())?;

    let lexicon = Lexicon::from_sources(&config, &profile);
    let intent = parse_command(text, &lexicon, today());
    let diff = create_diff(&intent, &config, &profile, today());

    print!("{}", display::format_diff(&diff));

    if !diff.safe {
        return Ok(());
    }
    if !confirmed {
        println!("Run again with --yes to apply.");
        return Ok(());
    }

    let applied = apply_adjustment(&diff, &mut config, &mut profile, paths)?;
    if applied {
        let store = AuditStore::new(paths.audits_dir());
        let record = store.save_applied(text, &diff)?;
        println!("Applied. Audit id: {}", record.audit_id);
    }
    Ok(())
}

/// List the audit history
pub fn handle_audits(paths: &CadencePaths) -> CadenceResult<()> {
    let store = AuditStore::new(paths.audits_dir());
    let records = store.list()?;
    print!("{}", display::audits_table(&records));
    Ok(())
}

/// Undo a previously applied adjustment by audit id
pub fn handle_revert(paths: &CadencePaths, audit_id: &str) -> CadenceResult<()> {
    let mut config = CashFlowConfig::load(&paths.config_file())?;
    let mut profile = UserProfile::load(&paths.profile_file())?;

    let store = AuditStore::new(paths.audits_dir());
    let revert = store.revert(audit_id, &mut config, &mut profile, paths)?;

    for change in &revert.changes_applied {
        println!("  - {change}");
    }
    println!("Reverted. Audit id: {}", revert.audit_id);
    Ok(())
}
