//! Plain-text rendering of the dashboard state for a terminal.
//!
//! Everything here is a pure render of a published [ViewState]; each
//! repaint replaces the previous output wholesale.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    config::DashboardConfig,
    coordinator::{ViewPhase, ViewState},
    models::{FilterOptions, PageResult, Transaction},
    pagination::{PaginationConfig, PaginationIndicator, page_indicators},
    query::{FilterField, QueryState},
};

/// The max number of graphemes to display in a text column before
/// truncating and displaying an ellipsis.
const MAX_TEXT_GRAPHEMES: usize = 24;

const HEADERS: [&str; 8] = [
    "Date", "Customer", "Region", "Product", "Qty", "Amount", "Payment", "Status",
];

/// Which columns hold numbers and are padded from the left.
const RIGHT_ALIGNED: [bool; 8] = [false, false, false, false, true, true, false, false];

/// Render one full repaint of the dashboard.
pub fn render_view(state: &ViewState, config: &DashboardConfig) -> String {
    let mut output = String::new();

    match (&state.page, state.phase) {
        (None, ViewPhase::Loading) => output.push_str("Loading transactions...\n"),
        (None, ViewPhase::Idle) => output.push_str("No transactions loaded yet.\n"),
        (Some(page), phase) => {
            if let Some(filters) = active_filters_line(&state.query) {
                output.push_str(&filters);
                output.push('\n');
            }
            output.push_str(&format!("Sort: {}\n", state.query.sort.label()));
            output.push_str(&format!(
                "Showing {} of {} transactions{}\n",
                page.transactions.len(),
                page.total_count,
                if phase == ViewPhase::Loading {
                    " (refreshing...)"
                } else {
                    ""
                },
            ));
            if page.transactions.is_empty() {
                output.push_str("No transactions found matching your criteria.\n");
            } else {
                output.push_str(&render_transactions(page));
            }
            if page.total_pages > 1 {
                output.push_str(&render_pager(page, &config.pagination));
                output.push('\n');
            }
        }
    }

    if let Some(notice) = &state.notice {
        output.push_str(&format!("! {notice}\n"));
    }

    output
}

/// Render the filter panel: every selectable value the API knows about.
pub fn render_filter_options(options: &FilterOptions) -> String {
    format!(
        "Regions: {}\nGenders: {}\nCategories: {}\nTags: {}\nPayment methods: {}\nAges: {} to {}\n",
        options.regions.join(", "),
        options.genders.join(", "),
        options.categories.join(", "),
        options.tags.join(", "),
        options.payment_methods.join(", "),
        options.age_range.min,
        options.age_range.max,
    )
}

fn render_transactions(page: &PageResult) -> String {
    let rows: Vec<[String; 8]> = page.transactions.iter().map(transaction_row).collect();

    let mut widths: [usize; 8] = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.graphemes(true).count());
        }
    }

    let mut output = String::new();
    output.push_str(&render_row(&HEADERS.map(str::to_owned), &widths));
    output.push('\n');
    output.push_str(&render_separator(&widths));
    output.push('\n');
    for row in &rows {
        output.push_str(&render_row(row, &widths));
        output.push('\n');
    }

    output
}

fn transaction_row(transaction: &Transaction) -> [String; 8] {
    [
        transaction.date.to_string(),
        truncate_text(&transaction.customer_name),
        transaction.customer_region.clone(),
        truncate_text(&transaction.product_name),
        transaction.quantity.to_string(),
        format_currency(transaction.final_amount),
        transaction.payment_method.clone(),
        transaction.order_status.clone(),
    ]
}

fn render_row(row: &[String; 8], widths: &[usize; 8]) -> String {
    let mut line = String::new();
    for (index, (cell, width)) in row.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str(" | ");
        }
        let padding = " ".repeat(width.saturating_sub(cell.graphemes(true).count()));
        if RIGHT_ALIGNED[index] {
            line.push_str(&padding);
            line.push_str(cell);
        } else {
            line.push_str(cell);
            // The last column stays ragged so lines carry no trailing
            // whitespace.
            if index < row.len() - 1 {
                line.push_str(&padding);
            }
        }
    }

    line
}

fn render_separator(widths: &[usize; 8]) -> String {
    let mut line = String::new();
    for (index, &width) in widths.iter().enumerate() {
        if index > 0 {
            line.push_str("-+-");
        }
        line.push_str(&"-".repeat(width));
    }

    line
}

fn render_pager(page: &PageResult, config: &PaginationConfig) -> String {
    let parts: Vec<String> = page_indicators(page, config)
        .iter()
        .map(|indicator| match indicator {
            PaginationIndicator::BackButton(_) => "<".to_owned(),
            PaginationIndicator::NextButton(_) => ">".to_owned(),
            PaginationIndicator::Ellipsis => "...".to_owned(),
            PaginationIndicator::Page(number) => number.to_string(),
            PaginationIndicator::CurrPage(number) => format!("[{number}]"),
        })
        .collect();

    format!(
        "Page {} of {}: {}",
        page.page,
        page.total_pages,
        parts.join(" ")
    )
}

fn active_filters_line(query: &QueryState) -> Option<String> {
    let mut parts = Vec::new();

    if !query.search.is_empty() {
        parts.push(format!("search \"{}\"", query.search));
    }
    for field in [
        FilterField::Regions,
        FilterField::Genders,
        FilterField::Categories,
        FilterField::Tags,
        FilterField::PaymentMethods,
    ] {
        let values = query.filter_values(field);
        if !values.is_empty() {
            parts.push(format!("{}: {}", field.label(), values.join(", ")));
        }
    }
    match (query.age_min, query.age_max) {
        (Some(min), Some(max)) => parts.push(format!("ages {min} to {max}")),
        (Some(min), None) => parts.push(format!("ages {min}+")),
        (None, Some(max)) => parts.push(format!("ages up to {max}")),
        (None, None) => {}
    }
    match (query.date_from, query.date_to) {
        (Some(from), Some(to)) => parts.push(format!("dates {from} to {to}")),
        (Some(from), None) => parts.push(format!("dates from {from}")),
        (None, Some(to)) => parts.push(format!("dates up to {to}")),
        (None, None) => {}
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("Filters: {}", parts.join("; ")))
    }
}

fn format_currency(number: f64) -> String {
    static CURRENCY_FMT: OnceLock<Formatter> = OnceLock::new();

    let formatter = CURRENCY_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    if number == 0.0 {
        // numfmt hardcodes zero as "0".
        return "$0.00".to_owned();
    }

    let mut formatted = formatter.fmt_string(number);
    // numfmt drops a trailing zero: 12.30 renders as "12.3".
    if formatted.as_bytes()[formatted.len() - 3] != b'.' {
        formatted = format!("{formatted}0");
    }

    formatted
}

fn truncate_text(text: &str) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= MAX_TEXT_GRAPHEMES {
        text.to_owned()
    } else {
        let mut truncated: String = graphemes[..MAX_TEXT_GRAPHEMES - 1].concat();
        truncated.push('…');
        truncated
    }
}
