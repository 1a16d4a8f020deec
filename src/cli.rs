use clap::{Parser, Subcommand};

/// courtage — tier decision & synchronization engine for tiered commission
/// schedules.
#[derive(Parser, Debug)]
#[command(name = "courtage", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the engine over an NDJSON traffic tap on stdin
    Run(RunArgs),

    /// Print the fee table for an order value
    Fee(FeeArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Base URL of the brokerage API (defaults to $AVANZA_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path to the preferences JSON file (in-memory defaults if omitted)
    #[arg(long)]
    pub prefs: Option<std::path::PathBuf>,

    /// Account base currency
    #[arg(long, default_value = "SEK")]
    pub base_currency: String,

    /// Quiet period after observed order facts (ms)
    #[arg(long, default_value = "300")]
    pub debounce_ms: u64,

    /// Minimum interval between courtage-class reads (ms)
    #[arg(long, default_value = "1000")]
    pub min_api_interval_ms: u64,

    /// Delay before the post-order reset switch (ms)
    #[arg(long, default_value = "500")]
    pub reset_delay_ms: u64,

    /// Output presentation events as JSON instead of TSV
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fee` subcommand.
#[derive(Parser, Debug)]
pub struct FeeArgs {
    /// Order value
    pub amount: rust_decimal::Decimal,

    /// Current courtage class (selects the schedule family)
    #[arg(long, default_value = "MINI")]
    pub class: String,
}
