//! Runtime configuration for the dashboard.

use std::time::Duration;

use crate::pagination::PaginationConfig;

/// The API base URL to use when none is given on the command line.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// The config that controls how the dashboard talks to the sales API and
/// how results are paged and displayed.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// The base URL of the sales API, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,

    /// The number of transactions to request per page.
    ///
    /// The server clamps this to 1..=100 and falls back to 10 when the
    /// parameter is missing; the dashboard always sends its configured
    /// value.
    pub page_size: u64,

    /// How long the search box must stay quiet before a fetch is issued.
    ///
    /// Edits inside the window replace the pending fetch rather than
    /// queueing additional ones.
    pub search_quiet_window: Duration,

    /// The config that controls the pagination indicator.
    pub pagination: PaginationConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            page_size: 10,
            search_quiet_window: Duration::from_millis(300),
            pagination: PaginationConfig::default(),
        }
    }
}
