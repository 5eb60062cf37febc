//! Salesdash is a terminal dashboard for browsing the sales transactions
//! served by a remote retail sales API.
//!
//! The library implements the pipeline between user edits and the API:
//! [QueryState] holds the current search/filter/sort/page selections,
//! [build_query] serializes them into request parameters,
//! [SalesApiClient] performs the fetch, and [ViewCoordinator] ties the
//! pieces together, debouncing search edits, discarding stale responses
//! and publishing [ViewState] snapshots for rendering.

#![warn(missing_docs)]

mod client;
mod config;
mod console;
mod coordinator;
mod models;
mod pagination;
mod query;
mod request;
mod table;

pub use client::{SalesApiClient, TransactionSource};
pub use config::{DEFAULT_API_BASE_URL, DashboardConfig};
pub use console::{Command, help_text, parse_command};
pub use coordinator::{DashboardHandle, Intent, ViewCoordinator, ViewPhase, ViewState};
pub use models::{AgeRange, FilterOptions, PageResult, Transaction};
pub use pagination::{PaginationConfig, PaginationIndicator, page_indicators};
pub use query::{FilterField, QueryState, SortOrder};
pub use request::{build_query, to_query_string};
pub use table::{render_filter_options, render_view};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The filter options could not be loaded from the API.
    ///
    /// The dashboard keeps running with an empty filter panel; filter
    /// options are requested once per session, so a restart is needed to
    /// get the panel back.
    #[error("could not load filter options: {0}")]
    OptionsLoad(#[source] FetchError),

    /// A transactions fetch failed.
    ///
    /// The previously displayed page is kept and a transient notice is
    /// shown. The next query change naturally issues a fresh fetch; the
    /// failed one is not retried.
    #[error("could not fetch transactions: {0}")]
    Fetch(#[source] FetchError),
}

/// The cause of one failed API request.
///
/// Transport failures, non-success statuses and undecodable bodies are all
/// reported through this type so each request has a single failure path.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed mid-flight.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server responded with a non-success status code.
    #[error("server returned status {status}: {body}")]
    ErrorStatus {
        /// The HTTP status code of the response.
        status: u16,
        /// The response body, truncated to keep log lines readable.
        body: String,
    },

    /// The response body could not be decoded as the expected JSON shape.
    #[error("could not decode response body: {0}")]
    Decode(String),
}
