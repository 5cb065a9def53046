use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog_types::split_labels;

pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 100_000.0;
pub const DEFAULT_MIN_RATING: f64 = 0.0;
pub const DEFAULT_MIN_DAYS: u32 = 1;
pub const DEFAULT_MAX_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Popular,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Popular => "popular",
            SortKey::PriceLow => "price_low",
            SortKey::PriceHigh => "price_high",
            SortKey::Rating => "rating",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(SortKey::Popular),
            "price_low" => Ok(SortKey::PriceLow),
            "price_high" => Ok(SortKey::PriceHigh),
            "rating" => Ok(SortKey::Rating),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationScope {
    #[default]
    All,
    Domestic,
    International,
}

impl DestinationScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationScope::All => "all",
            DestinationScope::Domestic => "domestic",
            DestinationScope::International => "international",
        }
    }
}

impl FromStr for DestinationScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DestinationScope::All),
            "domestic" => Ok(DestinationScope::Domestic),
            "international" => Ok(DestinationScope::International),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DestinationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every user-adjustable parameter of the discovery view. Lives only in
/// memory and in the URL query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub search_text: String,
    pub sort_key: SortKey,
    pub min_price: f64,
    pub max_price: f64,
    pub min_rating: f64,
    pub min_days: u32,
    pub max_days: u32,
    pub categories: BTreeSet<String>,
    pub destination_scope: DestinationScope,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort_key: SortKey::Popular,
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            min_rating: DEFAULT_MIN_RATING,
            min_days: DEFAULT_MIN_DAYS,
            max_days: DEFAULT_MAX_DAYS,
            categories: BTreeSet::new(),
            destination_scope: DestinationScope::All,
            page: 1,
        }
    }
}

/// A single user edit, as sent by the browser page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FilterEdit {
    SearchText(String),
    SortKey(SortKey),
    MinPrice(f64),
    MaxPrice(f64),
    MinRating(f64),
    MinDays(u32),
    MaxDays(u32),
    Categories(Vec<String>),
    ToggleCategory(String),
    DestinationScope(DestinationScope),
    Page(u32),
    Reset,
}

/// Owns the filter state and enforces the page-reset rules: any change to
/// what is shown sends the user back to page 1.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    pub fn new(state: FilterState) -> Self {
        let mut store = Self { state };
        store.state.page = store.state.page.max(1);
        store
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn into_state(self) -> FilterState {
        self.state
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.state.search_text = text.into();
        self.reset_page();
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.state.sort_key = sort_key;
        self.reset_page();
    }

    pub fn set_min_price(&mut self, min_price: f64) {
        self.state.min_price = amount_or(min_price, DEFAULT_MIN_PRICE);
        self.reset_page();
    }

    pub fn set_max_price(&mut self, max_price: f64) {
        self.state.max_price = amount_or(max_price, DEFAULT_MAX_PRICE);
        self.reset_page();
    }

    pub fn set_price_range(&mut self, min_price: f64, max_price: f64) {
        self.state.min_price = amount_or(min_price, DEFAULT_MIN_PRICE);
        self.state.max_price = amount_or(max_price, DEFAULT_MAX_PRICE);
        self.reset_page();
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        self.state.min_rating = amount_or(min_rating, DEFAULT_MIN_RATING);
        self.reset_page();
    }

    pub fn set_min_days(&mut self, min_days: u32) {
        self.state.min_days = min_days;
        self.reset_page();
    }

    pub fn set_max_days(&mut self, max_days: u32) {
        self.state.max_days = max_days;
        self.reset_page();
    }

    pub fn set_day_range(&mut self, min_days: u32, max_days: u32) {
        self.state.min_days = min_days;
        self.state.max_days = max_days;
        self.reset_page();
    }

    pub fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state.categories = categories
            .into_iter()
            .flat_map(|label| split_labels(label.as_ref()))
            .collect();
        self.reset_page();
    }

    /// Checks the category if unchecked, unchecks it otherwise.
    pub fn toggle_category(&mut self, category: &str) {
        for label in split_labels(category) {
            if !self.state.categories.remove(&label) {
                self.state.categories.insert(label);
            }
        }
        self.reset_page();
    }

    pub fn set_destination_scope(&mut self, scope: DestinationScope) {
        self.state.destination_scope = scope;
        self.reset_page();
    }

    pub fn set_page(&mut self, page: u32) {
        self.state.page = page.max(1);
    }

    /// Writes back the page the pipeline actually showed.
    pub fn clamp_page(&mut self, total_pages: u32) {
        self.state.page = self.state.page.clamp(1, total_pages.max(1));
    }

    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    pub fn apply(&mut self, edit: FilterEdit) {
        match edit {
            FilterEdit::SearchText(text) => self.set_search_text(text),
            FilterEdit::SortKey(sort_key) => self.set_sort_key(sort_key),
            FilterEdit::MinPrice(value) => self.set_min_price(value),
            FilterEdit::MaxPrice(value) => self.set_max_price(value),
            FilterEdit::MinRating(value) => self.set_min_rating(value),
            FilterEdit::MinDays(value) => self.set_min_days(value),
            FilterEdit::MaxDays(value) => self.set_max_days(value),
            FilterEdit::Categories(categories) => self.set_categories(categories),
            FilterEdit::ToggleCategory(category) => self.toggle_category(&category),
            FilterEdit::DestinationScope(scope) => self.set_destination_scope(scope),
            FilterEdit::Page(page) => self.set_page(page),
            FilterEdit::Reset => self.reset(),
        }
    }

    fn reset_page(&mut self) {
        self.state.page = 1;
    }
}

/// Amounts the URL can carry: negatives become zero, non-finite values fall
/// back to the field default.
fn amount_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}
