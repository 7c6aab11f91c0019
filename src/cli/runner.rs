//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ReportCommands};
use crate::client::{AccountsParams, TransactionsParams, UpClient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::report::{self, ReportPeriod};
use chrono::Local;
use std::io::Write;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = UpClient::new(self.client_config()?).await?;
        let output = self.execute(&client).await?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Run the command against `client` and return what would be printed
    pub async fn execute(&self, client: &UpClient) -> Result<String> {
        match &self.cli.command {
            Commands::Ping => Self::ping(client).await,
            Commands::Fetch { account, page_size } => {
                Self::fetch(client, account.as_deref(), *page_size).await
            }
            Commands::Report(ReportCommands::Categories) => Self::report_categories(client).await,
            Commands::Report(ReportCommands::Expenses { months, page_size }) => {
                Self::report_expenses(client, *months, *page_size).await
            }
        }
    }

    /// Load config from `--config` if given, else from the environment
    fn client_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => ClientConfig::load(path),
            None => ClientConfig::from_env(),
        }
    }

    async fn ping(client: &UpClient) -> Result<String> {
        let pong = client.ping().await?;
        Ok(format!("{} {}\n", pong.meta.status_emoji, pong.meta.id))
    }

    async fn fetch(
        client: &UpClient,
        account: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<String> {
        let accounts = client
            .get_accounts(&AccountsParams {
                page_size,
                ..AccountsParams::default()
            })
            .await?;

        let params = TransactionsParams {
            account_id: account.map(String::from),
            page_size,
            ..TransactionsParams::default()
        };
        let transactions = client.get_transactions(&params).await?;

        Ok(format!(
            "Accounts\n{}\nTransactions\n{}\n",
            serde_json::to_string_pretty(&accounts)?,
            serde_json::to_string_pretty(&transactions)?
        ))
    }

    async fn report_categories(client: &UpClient) -> Result<String> {
        let period = ReportPeriod::last_month(Local::now())?;
        info!(since = %period.since, until = ?period.until, "Fetching transactions");

        let params = TransactionsParams {
            since: Some(period.since),
            until: period.until,
            ..TransactionsParams::default()
        };
        let transactions = client.get_transactions(&params).await?;

        let totals = report::category_totals(&transactions);
        Ok(report::render_category_totals(&totals))
    }

    async fn report_expenses(client: &UpClient, months: u32, page_size: u32) -> Result<String> {
        let period = ReportPeriod::months_back(Local::now(), months)?;
        info!(since = %period.since, "Fetching transactions");

        let params = TransactionsParams {
            since: Some(period.since),
            page_size: Some(page_size),
            ..TransactionsParams::default()
        };
        let transactions = client.get_transactions(&params).await?;

        Ok(report::expenses_by_category(&transactions).render())
    }
}
