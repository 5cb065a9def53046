use std::collections::HashMap;

use crate::catalog_types::split_labels;
use crate::filter_state::FilterState;

/// Query parameter names, in the order they are written.
const PARAM_SEARCH: &str = "q";
const PARAM_SORT: &str = "sort";
const PARAM_MIN_PRICE: &str = "minPrice";
const PARAM_MAX_PRICE: &str = "maxPrice";
const PARAM_MIN_RATING: &str = "minRating";
const PARAM_MIN_DAYS: &str = "minDays";
const PARAM_MAX_DAYS: &str = "maxDays";
const PARAM_CATEGORIES: &str = "cats";
const PARAM_SCOPE: &str = "scope";
const PARAM_PAGE: &str = "page";

/// Splits a raw query string into its parameters. The first occurrence of a
/// repeated name wins, like `URLSearchParams.get`.
pub fn query_params(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();

    let mut params = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

/// Reads a filter state from a URL query string. Missing or malformed
/// parameters fall back to their defaults, unknown ones are ignored.
pub fn parse_query(query: &str) -> FilterState {
    let params = query_params(query);
    let defaults = FilterState::default();
    let get = |name: &str| params.get(name).map(|value| value.trim());

    FilterState {
        search_text: params.get(PARAM_SEARCH).cloned().unwrap_or_default(),
        sort_key: get(PARAM_SORT)
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.sort_key),
        min_price: get(PARAM_MIN_PRICE)
            .and_then(parse_amount)
            .unwrap_or(defaults.min_price),
        max_price: get(PARAM_MAX_PRICE)
            .and_then(parse_amount)
            .unwrap_or(defaults.max_price),
        min_rating: get(PARAM_MIN_RATING)
            .and_then(parse_amount)
            .unwrap_or(defaults.min_rating),
        min_days: get(PARAM_MIN_DAYS)
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.min_days),
        max_days: get(PARAM_MAX_DAYS)
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.max_days),
        categories: get(PARAM_CATEGORIES)
            .map(split_labels)
            .unwrap_or(defaults.categories),
        destination_scope: get(PARAM_SCOPE)
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.destination_scope),
        page: get(PARAM_PAGE)
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(defaults.page),
    }
}

fn parse_amount(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

/// Writes the parameters that differ from their defaults, so that shared
/// URLs stay short.
pub fn serialize_state(state: &FilterState) -> String {
    let defaults = FilterState::default();
    let mut pairs: Vec<(&str, String)> = Vec::new();

    if !state.search_text.is_empty() {
        pairs.push((PARAM_SEARCH, state.search_text.clone()));
    }
    if state.sort_key != defaults.sort_key {
        pairs.push((PARAM_SORT, state.sort_key.to_string()));
    }
    if state.min_price != defaults.min_price {
        pairs.push((PARAM_MIN_PRICE, state.min_price.to_string()));
    }
    if state.max_price != defaults.max_price {
        pairs.push((PARAM_MAX_PRICE, state.max_price.to_string()));
    }
    if state.min_rating != defaults.min_rating {
        pairs.push((PARAM_MIN_RATING, state.min_rating.to_string()));
    }
    if state.min_days != defaults.min_days {
        pairs.push((PARAM_MIN_DAYS, state.min_days.to_string()));
    }
    if state.max_days != defaults.max_days {
        pairs.push((PARAM_MAX_DAYS, state.max_days.to_string()));
    }
    if !state.categories.is_empty() {
        let joined = state
            .categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        pairs.push((PARAM_CATEGORIES, joined));
    }
    if state.destination_scope != defaults.destination_scope {
        pairs.push((PARAM_SCOPE, state.destination_scope.to_string()));
    }
    if state.page != defaults.page {
        pairs.push((PARAM_PAGE, state.page.to_string()));
    }

    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

/// Tracks the query string the browser currently shows and reports when it
/// has to be replaced. Replacing instead of pushing keeps filter tweaks out
/// of the back-button history.
#[derive(Debug, Clone, Default)]
pub struct QuerySync {
    current: Option<String>,
}

impl QuerySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the query string the page was opened with.
    pub fn mount(&mut self, raw_query: &str) {
        let raw_query = raw_query.strip_prefix('?').unwrap_or(raw_query);
        self.current = Some(raw_query.to_string());
    }

    /// Returns the canonical query when it differs from the one last shown.
    pub fn sync(&mut self, state: &FilterState) -> Option<String> {
        let canonical = serialize_state(state);
        if self.current.as_deref() == Some(canonical.as_str()) {
            return None;
        }
        self.current = Some(canonical.clone());
        Some(canonical)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

/// Formats a canonical query for `history.replaceState`.
pub fn to_location_search(query: &str) -> String {
    if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    }
}
