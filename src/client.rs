//! HTTP client for the remote sales API.

use std::future::Future;

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;

use crate::{
    FetchError,
    models::{FilterOptions, PageResult},
    request,
};

/// The endpoint serving pages of transactions.
const TRANSACTIONS_PATH: &str = "/sales/transactions";
/// The endpoint serving the universe of valid filter values.
const FILTER_OPTIONS_PATH: &str = "/sales/filter-options";

/// How much of an error response body to keep for the error message.
const ERROR_BODY_LIMIT: usize = 256;

/// The source of transaction pages and filter options for the dashboard.
///
/// The view coordinator talks to the API through this trait so tests can
/// stand in a scripted source without a network.
pub trait TransactionSource: Send + Sync + 'static {
    /// Fetch one page of transactions for the given query parameters.
    ///
    /// Issues exactly one request: no retries, no caching. Superseding an
    /// in-flight fetch is the caller's concern, not this trait's.
    fn fetch_page(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> impl Future<Output = Result<PageResult, FetchError>> + Send;

    /// Fetch the universe of valid filter values.
    ///
    /// The dashboard calls this at most once per session.
    fn fetch_filter_options(&self) -> impl Future<Output = Result<FilterOptions, FetchError>> + Send;
}

/// A client for one sales API server.
///
/// Each client is constructed explicitly with its base URL; there is no
/// process-wide default. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct SalesApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl SalesApiClient {
    /// Create a client for the API at `base_url`, e.g.
    /// `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ErrorStatus {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|error| FetchError::Decode(error.to_string()))
    }
}

impl TransactionSource for SalesApiClient {
    async fn fetch_page(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> Result<PageResult, FetchError> {
        tracing::debug!(
            "GET {TRANSACTIONS_PATH}?{}",
            request::to_query_string(&query)
        );
        let url = format!("{}{TRANSACTIONS_PATH}", self.base_url);
        let response = self.http_client.get(&url).query(&query).send().await?;

        Self::decode_response(response).await
    }

    async fn fetch_filter_options(&self) -> Result<FilterOptions, FetchError> {
        tracing::debug!("GET {FILTER_OPTIONS_PATH}");
        let url = format!("{}{FILTER_OPTIONS_PATH}", self.base_url);
        let response = self.http_client.get(&url).send().await?;

        Self::decode_response(response).await
    }
}

fn truncate_error_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
