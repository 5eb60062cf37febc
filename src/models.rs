//! Wire models for the sales API.
//!
//! These structs mirror the JSON served by the remote API. They are
//! read-only on this side: nothing is derived or recomputed locally, and
//! each fetched snapshot is replaced wholesale by the next one.

use serde::Deserialize;
use time::Date;

/// One sales record as served by the API.
///
/// Fields the data set does not always populate are optional. The
/// rendering layer must tolerate their absence rather than rejecting the
/// record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub transaction_id: i64,
    /// The date the sale happened.
    pub date: Date,
    /// The ID of the customer.
    pub customer_id: String,
    /// The customer's full name.
    pub customer_name: String,
    /// The customer's phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// The customer's gender.
    pub gender: String,
    /// The customer's age in years.
    #[serde(default)]
    pub age: Option<u32>,
    /// The region the customer lives in.
    pub customer_region: String,
    /// The customer type, e.g. "Returning".
    pub customer_type: String,
    /// The ID of the product sold.
    pub product_id: String,
    /// The name of the product sold.
    pub product_name: String,
    /// The brand of the product sold.
    pub brand: String,
    /// The category of the product sold.
    pub product_category: String,
    /// The product's tags as one comma-separated string, e.g.
    /// `"electronics, premium"`.
    #[serde(default)]
    pub tags: String,
    /// How many units were sold.
    pub quantity: u32,
    /// The price of one unit before any discount.
    pub price_per_unit: f64,
    /// The discount applied to the sale, as a percentage.
    pub discount_percentage: f64,
    /// The undiscounted total for the sale.
    pub total_amount: f64,
    /// The amount the customer actually paid.
    pub final_amount: f64,
    /// How the customer paid, e.g. "Credit Card".
    pub payment_method: String,
    /// The status of the order, e.g. "Delivered".
    pub order_status: String,
    /// How the order was delivered, e.g. "Home Delivery".
    pub delivery_type: String,
    /// The ID of the store the sale was made at.
    pub store_id: String,
    /// The location of the store the sale was made at.
    pub store_location: String,
    /// The ID of the salesperson who made the sale.
    pub salesperson_id: String,
    /// The name of the salesperson who made the sale.
    pub employee_name: String,
}

/// One fetched page of transactions plus its pagination metadata.
///
/// Pages are never merged: a successful fetch replaces the previous page
/// by reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageResult {
    /// The transactions on this page, in the requested sort order.
    pub transactions: Vec<Transaction>,
    /// How many transactions match the query across all pages.
    pub total_count: u64,
    /// The page number this result is for, 1-based.
    pub page: u64,
    /// The page size the server applied.
    pub page_size: u64,
    /// How many pages the query spans in total.
    pub total_pages: u64,
    /// Whether a page exists after this one.
    pub has_next: bool,
    /// Whether a page exists before this one.
    pub has_previous: bool,
}

/// The universe of valid filter values, fetched once per session.
///
/// The lists arrive sorted from the server and are displayed in that
/// order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterOptions {
    /// The customer regions present in the data set.
    pub regions: Vec<String>,
    /// The genders present in the data set.
    pub genders: Vec<String>,
    /// The product categories present in the data set.
    pub categories: Vec<String>,
    /// Every distinct product tag in the data set.
    pub tags: Vec<String>,
    /// The payment methods present in the data set.
    pub payment_methods: Vec<String>,
    /// The youngest and oldest customer ages in the data set.
    pub age_range: AgeRange,
}

/// An inclusive age range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AgeRange {
    /// The lower bound, inclusive.
    pub min: u32,
    /// The upper bound, inclusive.
    pub max: u32,
}
