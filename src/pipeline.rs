//! Pure derivation from the loaded catalog and a filter state to the page of
//! packages that is shown. Nothing here keeps memory between runs; every call
//! recomputes from scratch.

use crate::catalog_types::{Destination, DestinationMap, Package};
use crate::filter_state::{DestinationScope, FilterState, SortKey};

pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Country that classifies a destination as domestic.
    pub home_country: String,
    pub page_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            home_country: "India".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPage<'a> {
    pub items: Vec<&'a Package>,
    pub filtered_count: usize,
    pub total_pages: u32,
    /// Requested page after clamping into `[1, total_pages]`.
    pub page: u32,
}

pub fn derive<'a>(
    packages: &'a [Package],
    destinations: &DestinationMap,
    state: &FilterState,
    settings: &PipelineSettings,
) -> DerivedPage<'a> {
    let filtered = filter_and_sort(packages, destinations, state, settings);
    paginate(filtered, state.page, settings.page_size)
}

/// Applies every filter and the sort order, before pagination.
pub fn filter_and_sort<'a>(
    packages: &'a [Package],
    destinations: &DestinationMap,
    state: &FilterState,
    settings: &PipelineSettings,
) -> Vec<&'a Package> {
    let query = state.search_text.trim().to_lowercase();
    let (min_price, max_price) = ordered(state.min_price, state.max_price);
    let (min_days, max_days) = ordered(state.min_days, state.max_days);
    let selected: Vec<String> = state
        .categories
        .iter()
        .map(|category| category.to_lowercase())
        .collect();

    let mut filtered: Vec<&Package> = packages
        .iter()
        .filter(|package| package.is_active())
        .filter(|package| {
            let destination = destinations.get(&package.destination);
            matches_text(package, destination, &query)
                && matches_scope(destination, state.destination_scope, &settings.home_country)
        })
        .filter(|package| {
            package.price >= min_price
                && package.price <= max_price
                && package.rating >= state.min_rating
                && package.duration >= min_days
                && package.duration <= max_days
        })
        .filter(|package| {
            selected.is_empty()
                || selected
                    .iter()
                    .any(|category| package.categories.contains(category))
        })
        .collect();

    sort_packages(&mut filtered, state.sort_key);
    filtered
}

/// Stable sort; `popular` keeps the order the backend returned.
pub fn sort_packages(packages: &mut [&Package], sort_key: SortKey) {
    match sort_key {
        SortKey::Popular => {}
        SortKey::PriceLow => packages.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceHigh => packages.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::Rating => packages.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
}

pub fn total_pages(filtered_count: usize, page_size: usize) -> u32 {
    let page_size = effective_page_size(page_size);
    filtered_count.div_ceil(page_size).max(1) as u32
}

pub fn paginate(filtered: Vec<&Package>, requested_page: u32, page_size: usize) -> DerivedPage<'_> {
    let page_size = effective_page_size(page_size);
    let filtered_count = filtered.len();
    let total_pages = total_pages(filtered_count, page_size);
    let page = requested_page.clamp(1, total_pages);

    let start = (page as usize - 1) * page_size;
    let items = filtered.into_iter().skip(start).take(page_size).collect();

    DerivedPage {
        items,
        filtered_count,
        total_pages,
        page,
    }
}

fn effective_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

fn ordered<T: PartialOrd>(low: T, high: T) -> (T, T) {
    if low > high {
        (high, low)
    } else {
        (low, high)
    }
}

fn matches_text(package: &Package, destination: Option<&Destination>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let contains = |field: &str| field.to_lowercase().contains(query);

    contains(&package.title)
        || contains(&package.destination)
        || destination.is_some_and(|destination| {
            contains(&destination.place)
                || contains(&destination.state)
                || contains(&destination.country)
        })
}

pub fn is_home_country(country: &str, home_country: &str) -> bool {
    let country = country.trim();
    !country.is_empty() && country.eq_ignore_ascii_case(home_country.trim())
}

fn matches_scope(
    destination: Option<&Destination>,
    scope: DestinationScope,
    home_country: &str,
) -> bool {
    match scope {
        DestinationScope::All => true,
        DestinationScope::Domestic => {
            destination.is_some_and(|destination| is_home_country(&destination.country, home_country))
        }
        DestinationScope::International => destination.is_some_and(|destination| {
            !destination.country.trim().is_empty()
                && !is_home_country(&destination.country, home_country)
        }),
    }
}
