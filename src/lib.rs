//! # upbank
//!
//! A client for the [Up](https://up.com.au) banking API, plus reports that
//! aggregate transactions by category and payee.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use upbank::client::{TransactionsParams, UpClient};
//! use upbank::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Reads API_TOKEN and pings the API
//!     let client = UpClient::from_env().await?;
//!
//!     for account in client.get_accounts(&Default::default()).await? {
//!         let params = TransactionsParams::for_account(&account.id);
//!         let transactions = client.get_transactions(&params).await?;
//!         println!("{}: {} transactions", account.attributes.display_name, transactions.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  cli: ping · fetch · report categories · report expenses  │
//! └───────────────┬───────────────────────────┬───────────────┘
//!                 │                           │
//! ┌───────────────┴──────────────┐  ┌─────────┴───────────────┐
//! │ client: UpClient             │  │ report: totals, payees  │
//! │ accounts · transactions      │  └─────────────────────────┘
//! ├──────────┬─────────┬─────────┤
//! │   auth   │  http   │ paginate│
//! │  Bearer  │ Retry   │ links.  │
//! │          │ Limit   │  next   │
//! └──────────┴─────────┴─────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// API resource types
pub mod types;

/// Bearer token authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// `links.next` traversal
pub mod pagination;

/// Client configuration
pub mod config;

/// The API client
pub mod client;

/// Category and payee reports
pub mod report;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{AccountsParams, TransactionsParams, UpClient};
pub use config::ClientConfig;
pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
