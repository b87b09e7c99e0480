use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cadence::cli::{
    handle_adjust, handle_audits, handle_config_command, handle_event_command, handle_forecast,
    handle_init, handle_loops, handle_revert, handle_tomorrow, ConfigCommands, EventCommands,
};
use cadence::config::CadencePaths;

#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Cash-flow forecasting and plain-English budget adjustments",
    long_about = "cadence tracks recurring income, bills, and cash-advance loops, \
                  projects your balance day by day, and lets you adjust the model \
                  with plain-English instructions — every change audited and \
                  revertible."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Record or import cash-flow events
    #[command(subcommand)]
    Event(EventCommands),

    /// Project the next 7 days of balances
    Forecast {
        /// Window start date (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Starting bank balance in decimal dollars
        #[arg(long, default_value = "0")]
        bank: String,
        /// Starting cash on hand in decimal dollars
        #[arg(long)]
        cash: Option<String>,
    },

    /// What can I spend tomorrow?
    Tomorrow {
        /// Today's bank balance in decimal dollars
        #[arg(long, default_value = "0")]
        balance: String,
    },

    /// Loop usage for the current week, or a non-usage streak
    Loops {
        /// Report the weeks-without streak for this loop
        #[arg(long)]
        streak: Option<String>,
        /// Lookback window in weeks for streaks
        #[arg(long, default_value_t = 12)]
        weeks: u32,
    },

    /// Adjust the model with a plain-English instruction
    Adjust {
        /// The instruction, e.g. "Lower EarnIn to 300"
        text: String,
        /// Apply the change (otherwise just show the diff)
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List the audit history
    Audits,

    /// Undo an applied adjustment by audit id
    Revert { audit_id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = CadencePaths::new()?;

    match cli.command {
        Commands::Init => handle_init(&paths)?,
        Commands::Config(command) => handle_config_command(&paths, command)?,
        Commands::Event(command) => handle_event_command(&paths, command)?,
        Commands::Forecast { start, bank, cash } => handle_forecast(&paths, start, bank, cash)?,
        Commands::Tomorrow { balance } => handle_tomorrow(&paths, balance)?,
        Commands::Loops { streak, weeks } => handle_loops(&paths, streak, weeks)?,
        Commands::Adjust { text, yes } => handle_adjust(&paths, &text, yes)?,
        Commands::Audits => handle_audits(&paths)?,
        Commands::Revert { audit_id } => handle_revert(&paths, &audit_id)?,
    }

    Ok(())
}
