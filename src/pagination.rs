//! The pagination indicator model for the pager surface.

use crate::models::PageResult;

/// The config that controls the pagination indicator.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The maximum number of page numbers to show in the indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_pages: 5 }
    }
}

/// One element of the pagination indicator, in display order.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to the previous page.
    BackButton(u64),
    /// A link to another page.
    Page(u64),
    /// The page currently displayed.
    CurrPage(u64),
    /// A gap between the shown page numbers and the first or last page.
    Ellipsis,
    /// A link to the next page.
    NextButton(u64),
}

/// Build the pagination indicator for a fetched page.
///
/// Shows at most `config.max_pages` page numbers centered on the current
/// page, with the first and last page kept reachable behind an ellipsis
/// and back/next buttons at the ends where they apply.
pub fn page_indicators(result: &PageResult, config: &PaginationConfig) -> Vec<PaginationIndicator> {
    let curr_page = result.page;
    let page_count = result.total_pages;
    let max_pages = config.max_pages;

    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if result.has_previous {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if result.has_next {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
