use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog::LoadState;
use crate::catalog_types::{DestinationMap, Package};
use crate::filter_state::FilterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCard {
    pub id: String,
    pub title: String,
    /// Resolved "place, country", or the raw destination id while
    /// destinations are unavailable.
    pub destination_name: String,
    pub price: f64,
    pub rating: f64,
    pub duration: u32,
    pub categories: Vec<String>,
    pub image: Option<String>,
}

impl PackageCard {
    pub fn new(package: &Package, destinations: &DestinationMap) -> Self {
        let destination_name = destinations
            .get(&package.destination)
            .map(|destination| destination.display_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| package.destination.clone());

        Self {
            id: package.id.clone(),
            title: package.title.clone(),
            destination_name,
            price: package.price,
            rating: package.rating,
            duration: package.duration,
            categories: package.categories.iter().cloned().collect(),
            image: package.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl Pagination {
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        let page = page.clamp(1, total_pages);
        let has_prev = page > 1;
        let has_next = page < total_pages;

        Self {
            page,
            total_pages,
            has_prev,
            has_next,
            prev_page: has_prev.then(|| page - 1),
            next_page: has_next.then(|| page + 1),
        }
    }
}

/// Everything the discovery page needs to render one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryView {
    pub status: LoadState,
    pub error_banner: Option<String>,
    pub view_mode: ViewMode,
    pub filters: FilterState,
    pub available_categories: Vec<String>,
    pub items: Vec<PackageCard>,
    /// True only once packages are loaded and nothing matches.
    pub empty: bool,
    pub filtered_count: usize,
    pub pagination: Pagination,
    /// Canonical query string for the current filters, without `?`.
    pub query: String,
    /// Set when the browser must `history.replaceState` to this search.
    pub replace_url: Option<String>,
}

/// Labels offered as category checkboxes: everything the visible catalog
/// uses.
pub fn available_categories(packages: &[Package]) -> Vec<String> {
    packages
        .iter()
        .filter(|package| package.is_active())
        .flat_map(|package| package.categories.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
