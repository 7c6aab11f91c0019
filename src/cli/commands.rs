//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Up banking API client
#[derive(Parser, Debug)]
#[command(name = "upbank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML). The token is read from API_TOKEN.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Longest window `report expenses` accepts
pub const MAX_REPORT_MONTHS: i64 = 1200;

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the access token
    Ping,

    /// Print accounts and transactions as JSON
    Fetch {
        /// Only fetch transactions of this account
        #[arg(long)]
        account: Option<String>,

        /// Page size for list requests
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Aggregate transactions into reports
    #[command(subcommand)]
    Report(ReportCommands),
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals per category from two months ago to one month ago
    Categories,

    /// Spending per category and payee
    Expenses {
        /// How many months back to include
        #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=MAX_REPORT_MONTHS))]
        months: u32,

        /// Page size for transaction requests
        #[arg(long, default_value = "100")]
        page_size: u32,
    },
}
