//! Serialization of [QueryState] into sales API query parameters.

use crate::query::QueryState;

/// Serialize `query` as ordered key/value pairs for the transactions
/// endpoint.
///
/// Keys with nothing to say are omitted entirely: an empty filter set
/// means "no restriction", not "match nothing", and an empty search term
/// means no search. Multi-valued fields are comma-joined under a single
/// key. `sort_by`, `page` and `page_size` are always present. The field
/// order is fixed, so the same state always produces the same request.
pub fn build_query(query: &QueryState, page_size: u64) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    if !query.search.is_empty() {
        pairs.push(("search", query.search.clone()));
    }
    push_joined(&mut pairs, "customer_regions", &query.regions);
    push_joined(&mut pairs, "genders", &query.genders);
    if let Some(age_min) = query.age_min {
        pairs.push(("age_min", age_min.to_string()));
    }
    if let Some(age_max) = query.age_max {
        pairs.push(("age_max", age_max.to_string()));
    }
    push_joined(&mut pairs, "product_categories", &query.categories);
    push_joined(&mut pairs, "tags", &query.tags);
    push_joined(&mut pairs, "payment_methods", &query.payment_methods);
    if let Some(date_from) = query.date_from {
        pairs.push(("date_from", date_from.to_string()));
    }
    if let Some(date_to) = query.date_to {
        pairs.push(("date_to", date_to.to_string()));
    }
    pairs.push(("sort_by", query.sort.as_query_value().to_owned()));
    pairs.push(("page", query.page.to_string()));
    pairs.push(("page_size", page_size.to_string()));

    pairs
}

fn push_joined(pairs: &mut Vec<(&'static str, String)>, key: &'static str, values: &[String]) {
    if !values.is_empty() {
        pairs.push((key, values.join(",")));
    }
}

/// Render query pairs as a URL-encoded string, for request logs and tests.
pub fn to_query_string(pairs: &[(&'static str, String)]) -> String {
    serde_urlencoded::to_string(pairs)
        .inspect_err(|error| tracing::error!("could not encode query pairs: {error}"))
        .unwrap_or_default()
}
