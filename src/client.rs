//! Up API client
//!
//! [`UpClient`] holds the authenticated transport and exposes the read
//! endpoints. List endpoints are traversed by following `links.next` until
//! the API stops returning one.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{NextPage, PaginationState};
use crate::types::{
    AccountResource, AccountType, CategoryResource, ErrorResponse, ListResponse, OwnershipType,
    PingResponse, SingleResponse, Timestamp, TransactionResource, TransactionStatus,
};
use chrono::SecondsFormat;
use futures::stream::{self, Stream, TryStreamExt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Upper bound on the token check performed on construction
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Filters for [`UpClient::get_accounts`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountsParams {
    /// `page[size]`
    pub page_size: Option<u32>,
    /// `filter[accountType]`
    pub account_type: Option<AccountType>,
    /// `filter[ownershipType]`
    pub ownership_type: Option<OwnershipType>,
}

/// Filters for [`UpClient::get_transactions`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionsParams {
    /// Restrict to one account; `None` lists transactions across all accounts
    pub account_id: Option<String>,
    /// `page[size]`
    pub page_size: Option<u32>,
    /// `filter[status]`
    pub status: Option<TransactionStatus>,
    /// `filter[since]`, inclusive
    pub since: Option<Timestamp>,
    /// `filter[until]`, exclusive
    pub until: Option<Timestamp>,
    /// `filter[category]`
    pub category: Option<String>,
    /// `filter[tag]`
    pub tag: Option<String>,
}

impl TransactionsParams {
    /// Transactions of a single account
    pub fn for_account(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            ..Self::default()
        }
    }
}

/// Where the next page comes from
struct Cursor {
    next: Option<(String, RequestConfig)>,
    state: PaginationState,
}

/// Authenticated client for the Up banking API
#[derive(Debug)]
pub struct UpClient {
    http: HttpClient,
    config: ClientConfig,
    base: Url,
}

impl UpClient {
    /// Build a client and verify the token with `GET /util/ping`
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let client = Self::connect(config)?;
        client.ping().await.map_err(|e| Error::Ping(Box::new(e)))?;
        Ok(client)
    }

    /// Build a client from `API_TOKEN` (and `UP_BASE_URL`)
    pub async fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?).await
    }

    /// Build a client without contacting the API
    pub fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = Url::parse(&config.base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }
        let http = HttpClient::with_auth(config.http_config(), config.auth()?)?;
        Ok(Self { http, config, base })
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /util/ping`, without retries and bounded by [`PING_TIMEOUT`]
    pub async fn ping(&self) -> Result<PingResponse> {
        let url = self.endpoint(&["util", "ping"])?;
        let request = RequestConfig::new().timeout(PING_TIMEOUT).retries(0);
        tokio::time::timeout(PING_TIMEOUT, self.get_ok_json(&url, request))
            .await
            .map_err(|_| Error::Timeout {
                timeout_ms: PING_TIMEOUT.as_millis() as u64,
            })?
    }

    /// All accounts, following pagination
    pub async fn get_accounts(&self, params: &AccountsParams) -> Result<Vec<AccountResource>> {
        info!("GetAccounts");
        let url = self.endpoint(&["accounts"])?;
        let request = RequestConfig::new()
            .query_opt("page[size]", params.page_size.or(self.config.page_size))
            .query_opt(
                "filter[accountType]",
                params.account_type.map(|t| t.as_str()),
            )
            .query_opt(
                "filter[ownershipType]",
                params.ownership_type.map(|t| t.as_str()),
            );
        self.pages(url, request).try_concat().await
    }

    /// A single account
    pub async fn get_account(&self, account_id: &str) -> Result<AccountResource> {
        info!(account_id, "GetAccount");
        let url = self.endpoint(&["accounts", account_id])?;
        let response: SingleResponse<AccountResource> =
            self.get_ok_json(&url, RequestConfig::new()).await?;
        Ok(response.data)
    }

    /// All transactions matching `params`, in the order the API returns them
    pub async fn get_transactions(
        &self,
        params: &TransactionsParams,
    ) -> Result<Vec<TransactionResource>> {
        self.transaction_pages(params)?.try_concat().await
    }

    /// Transactions matching `params`, one stream item per page
    pub fn transaction_pages(
        &self,
        params: &TransactionsParams,
    ) -> Result<impl Stream<Item = Result<Vec<TransactionResource>>> + '_> {
        info!(account_id = ?params.account_id, "GetTransactions");

        let url = match params.account_id.as_deref() {
            Some(id) => self.endpoint(&["accounts", id, "transactions"])?,
            None => self.endpoint(&["transactions"])?,
        };
        let request = RequestConfig::new()
            .query_opt("page[size]", params.page_size.or(self.config.page_size))
            .query_opt("filter[status]", params.status.map(|s| s.as_str()))
            .query_opt("filter[since]", params.since.as_ref().map(format_timestamp))
            .query_opt("filter[until]", params.until.as_ref().map(format_timestamp))
            .query_opt("filter[category]", params.category.as_deref())
            .query_opt("filter[tag]", params.tag.as_deref());

        Ok(self.pages(url, request))
    }

    /// A single transaction
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<TransactionResource> {
        info!(transaction_id, "GetTransaction");
        let url = self.endpoint(&["transactions", transaction_id])?;
        let response: SingleResponse<TransactionResource> =
            self.get_ok_json(&url, RequestConfig::new()).await?;
        Ok(response.data)
    }

    /// Categories, optionally only the children of `parent`
    pub async fn get_categories(&self, parent: Option<&str>) -> Result<Vec<CategoryResource>> {
        info!(parent, "GetCategories");
        let url = self.endpoint(&["categories"])?;
        let request = RequestConfig::new().query_opt("filter[parent]", parent);
        self.pages(url, request).try_concat().await
    }

    /// Absolute URL for a path below the base URL; segments are
    /// percent-encoded individually.
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Lazily walk a list endpoint
    fn pages<T: DeserializeOwned + 'static>(
        &self,
        url: String,
        request: RequestConfig,
    ) -> impl Stream<Item = Result<Vec<T>>> + '_ {
        let cursor = Cursor {
            next: Some((url, request)),
            state: PaginationState::with_max_pages(self.config.max_pages),
        };
        stream::try_unfold(cursor, move |cursor| self.fetch_page::<T>(cursor))
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        mut cursor: Cursor,
    ) -> Result<Option<(Vec<T>, Cursor)>> {
        let Some((url, request)) = cursor.next.take() else {
            return Ok(None);
        };
        cursor.state.visit(&url)?;

        let page: ListResponse<T> = self.get_ok_json(&url, request).await?;
        debug!(url = %url, count = page.data.len(), "fetched page");

        match cursor.state.advance(&page.links, page.data.len()) {
            // The next link already carries the original query.
            NextPage::Continue { url } => {
                self.check_origin(&url)?;
                cursor.next = Some((url, RequestConfig::new()));
            }
            NextPage::Done if cursor.state.truncated => warn!(
                pages = cursor.state.pages,
                records = cursor.state.total_fetched,
                "stopped at max_pages, results are incomplete"
            ),
            NextPage::Done => {}
        }

        Ok(Some((page.data, cursor)))
    }

    /// The token is only ever sent to the host of the base URL
    fn check_origin(&self, url: &str) -> Result<()> {
        let same = Url::parse(url).is_ok_and(|next| next.origin() == self.base.origin());
        if !same {
            return Err(Error::ForeignLink {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// GET expecting exactly HTTP 200 and a JSON body
    async fn get_ok_json<T: DeserializeOwned>(&self, url: &str, request: RequestConfig) -> Result<T> {
        let response = self
            .http
            .get(url, request)
            .await
            .map_err(api_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                expected: StatusCode::OK.as_u16(),
                received: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::decode(format!("{url}: {e}")))
    }
}

/// Turn an error body from the API into [`Error::Api`]
fn api_error(err: Error) -> Error {
    let Error::HttpStatus { status, body } = err else {
        return err;
    };
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let first = &parsed.errors[0];
            Error::Api {
                status,
                title: first.title.clone(),
                detail: first.detail.clone(),
            }
        }
        _ => Error::HttpStatus { status, body },
    }
}

fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}
