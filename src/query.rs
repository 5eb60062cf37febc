//! The user's current search, filter, sort and page selections.

use time::Date;

/// The order to sort transactions in, as understood by the sales API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest transactions first. This is also the server's default.
    #[default]
    DateDescending,
    /// Oldest transactions first.
    DateAscending,
    /// Largest quantities first.
    QuantityDescending,
    /// Smallest quantities first.
    QuantityAscending,
    /// Customer names A to Z.
    CustomerNameAscending,
    /// Customer names Z to A.
    CustomerNameDescending,
}

impl SortOrder {
    /// Every sort order, in the order the sort selector lists them.
    pub const ALL: [SortOrder; 6] = [
        SortOrder::DateDescending,
        SortOrder::DateAscending,
        SortOrder::QuantityDescending,
        SortOrder::QuantityAscending,
        SortOrder::CustomerNameAscending,
        SortOrder::CustomerNameDescending,
    ];

    /// The value the API expects in the `sort_by` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::DateDescending => "date_desc",
            Self::DateAscending => "date_asc",
            Self::QuantityDescending => "quantity_desc",
            Self::QuantityAscending => "quantity_asc",
            Self::CustomerNameAscending => "customer_name_asc",
            Self::CustomerNameDescending => "customer_name_desc",
        }
    }

    /// The human-readable label for the sort selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::DateDescending => "Date (newest first)",
            Self::DateAscending => "Date (oldest first)",
            Self::QuantityDescending => "Quantity (high to low)",
            Self::QuantityAscending => "Quantity (low to high)",
            Self::CustomerNameAscending => "Customer name (A-Z)",
            Self::CustomerNameDescending => "Customer name (Z-A)",
        }
    }

    /// Parse a `sort_by` query value back into a sort order.
    pub fn from_query_value(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_query_value() == value)
    }
}

/// The multi-valued filter fields of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Customer regions.
    Regions,
    /// Customer genders.
    Genders,
    /// Product categories.
    Categories,
    /// Product tags.
    Tags,
    /// Payment methods.
    PaymentMethods,
}

impl FilterField {
    /// The human-readable label for the filter panel.
    pub fn label(self) -> &'static str {
        match self {
            Self::Regions => "Regions",
            Self::Genders => "Genders",
            Self::Categories => "Categories",
            Self::Tags => "Tags",
            Self::PaymentMethods => "Payment methods",
        }
    }
}

/// The current user-chosen search/filter/sort/page selections.
///
/// Mutations go through the intent methods below. Every intent except
/// [QueryState::set_page] snaps the page number back to 1, so a changed
/// query can never point past the end of its new result set.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// Free-text search over customer name and phone number.
    pub search: String,
    /// The selected customer regions. Empty means no region restriction.
    pub regions: Vec<String>,
    /// The selected genders. Empty means no gender restriction.
    pub genders: Vec<String>,
    /// The selected product categories. Empty means no restriction.
    pub categories: Vec<String>,
    /// The selected product tags. Empty means no restriction.
    pub tags: Vec<String>,
    /// The selected payment methods. Empty means no restriction.
    pub payment_methods: Vec<String>,
    /// The minimum customer age, inclusive. Absent means unbounded.
    pub age_min: Option<u32>,
    /// The maximum customer age, inclusive. Absent means unbounded.
    pub age_max: Option<u32>,
    /// The earliest transaction date, inclusive. Absent means unbounded.
    pub date_from: Option<Date>,
    /// The latest transaction date, inclusive. Absent means unbounded.
    pub date_to: Option<Date>,
    /// The order results are sorted in.
    pub sort: SortOrder,
    /// The current page number, 1-based.
    pub page: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            regions: Vec::new(),
            genders: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            payment_methods: Vec::new(),
            age_min: None,
            age_max: None,
            date_from: None,
            date_to: None,
            sort: SortOrder::default(),
            page: 1,
        }
    }
}

impl QueryState {
    /// Replace the search term verbatim.
    ///
    /// The term is not trimmed or normalized; the server decides how to
    /// match it.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Toggle `value` in the named filter set: remove it if present, add it
    /// to the end otherwise.
    pub fn toggle_filter_value(&mut self, field: FilterField, value: &str) {
        let values = self.filter_values_mut(field);
        match values.iter().position(|selected| selected == value) {
            Some(index) => {
                values.remove(index);
            }
            None => values.push(value.to_owned()),
        }
        self.page = 1;
    }

    /// Replace both age bounds at once. Either bound may be absent.
    ///
    /// The bounds are passed to the API as given; whether min exceeds max
    /// is for the input surface or the server to care about.
    pub fn set_age_range(&mut self, min: Option<u32>, max: Option<u32>) {
        self.age_min = min;
        self.age_max = max;
        self.page = 1;
    }

    /// Replace both date bounds at once. Either bound may be absent.
    pub fn set_date_range(&mut self, from: Option<Date>, to: Option<Date>) {
        self.date_from = from;
        self.date_to = to;
        self.page = 1;
    }

    /// Replace the sort order.
    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort = order;
        self.page = 1;
    }

    /// Jump to a page of the current result set.
    ///
    /// This is the one mutation that keeps the number it was given instead
    /// of resetting to 1. Page numbers are 1-based; 0 is treated as 1.
    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    /// Clear the search term, every filter set and both bound pairs.
    ///
    /// The sort order survives clearing; the page number resets like any
    /// other filter-state change.
    pub fn clear_all(&mut self) {
        self.search.clear();
        self.regions.clear();
        self.genders.clear();
        self.categories.clear();
        self.tags.clear();
        self.payment_methods.clear();
        self.age_min = None;
        self.age_max = None;
        self.date_from = None;
        self.date_to = None;
        self.page = 1;
    }

    /// The selected values of one filter set.
    pub fn filter_values(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::Regions => &self.regions,
            FilterField::Genders => &self.genders,
            FilterField::Categories => &self.categories,
            FilterField::Tags => &self.tags,
            FilterField::PaymentMethods => &self.payment_methods,
        }
    }

    fn filter_values_mut(&mut self, field: FilterField) -> &mut Vec<String> {
        match field {
            FilterField::Regions => &mut self.regions,
            FilterField::Genders => &mut self.genders,
            FilterField::Categories => &mut self.categories,
            FilterField::Tags => &mut self.tags,
            FilterField::PaymentMethods => &mut self.payment_methods,
        }
    }
}
