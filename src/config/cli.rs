use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "estate")]
#[command(about = "Evaluate property listing rules against a TOML dataset")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "estate.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Print the resulting listing as JSON
    #[arg(long)]
    pub json: bool,

    /// Include archived properties in the listing
    #[arg(long)]
    pub all: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the listing without changing anything
    Summary,
    /// Mark a property as sold
    Sell { property: u64 },
    /// Cancel a property
    Cancel { property: u64 },
    /// Archive a property
    Archive { property: u64 },
    /// Copy a property, resetting its sale fields
    Duplicate { property: u64 },
    /// Accept an offer
    Accept { offer: u64 },
    /// Refuse an offer
    Refuse { offer: u64 },
    /// Move an offer deadline (YYYY-MM-DD) and derive its validity
    Deadline { offer: u64, date: NaiveDate },
}
