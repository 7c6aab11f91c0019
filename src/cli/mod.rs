//! CLI module
//!
//! Command-line interface for the Up API.
//!
//! # Commands
//!
//! - `ping` - Verify the access token
//! - `fetch` - Dump accounts and transactions as JSON
//! - `report categories` - Totals per category for last month
//! - `report expenses` - Spending per category and payee

mod commands;
mod runner;

pub use commands::{Cli, Commands, ReportCommands};
pub use runner::Runner;
