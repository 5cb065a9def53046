use log::debug;

use crate::catalog::{CatalogSnapshot, LoadState};
use crate::filter_state::{FilterEdit, FilterState, FilterStore};
use crate::pipeline::{self, PipelineSettings};
use crate::query_sync::{self, QuerySync};
use crate::view::{available_categories, DiscoveryView, PackageCard, Pagination, ViewMode};

/// One open discovery page: the filter store, the URL it is bound to and the
/// chosen layout.
#[derive(Debug, Clone, Default)]
pub struct DiscoverySession {
    store: FilterStore,
    sync: QuerySync,
    view_mode: ViewMode,
}

impl DiscoverySession {
    /// Parses the query string before anything is derived, so a shared URL
    /// never renders unfiltered first.
    pub fn mount(raw_query: &str) -> Self {
        let mut sync = QuerySync::new();
        sync.mount(raw_query);

        Self {
            store: FilterStore::new(query_sync::parse_query(raw_query)),
            sync,
            view_mode: ViewMode::default(),
        }
    }

    pub fn state(&self) -> &FilterState {
        self.store.state()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn apply(&mut self, edit: FilterEdit) {
        self.store.apply(edit);
    }

    pub fn apply_all(&mut self, edits: impl IntoIterator<Item = FilterEdit>) {
        for edit in edits {
            self.store.apply(edit);
        }
    }

    /// Derives the visible page, clamps the stored page to what exists and
    /// re-serialises the URL. While the catalog is still loading the filtered
    /// set is unknown, so the requested page is kept as is.
    pub fn render(&mut self, snapshot: &CatalogSnapshot, settings: &PipelineSettings) -> DiscoveryView {
        let derived = pipeline::derive(
            &snapshot.packages,
            &snapshot.destinations,
            self.store.state(),
            settings,
        );
        let loading = snapshot.load_state == LoadState::Loading;
        if !loading {
            self.store.clamp_page(derived.total_pages);
        }

        debug!(
            "Derived {} of {} packages, page {}/{}",
            derived.items.len(),
            derived.filtered_count,
            derived.page,
            derived.total_pages
        );

        let items: Vec<PackageCard> = derived
            .items
            .iter()
            .map(|package| PackageCard::new(package, &snapshot.destinations))
            .collect();

        let replace_url = self
            .sync
            .sync(self.store.state())
            .map(|query| query_sync::to_location_search(&query));
        let query = self.sync.current().unwrap_or_default().to_string();

        DiscoveryView {
            status: snapshot.load_state,
            error_banner: snapshot.error_banner.clone(),
            view_mode: self.view_mode,
            filters: self.store.state().clone(),
            available_categories: available_categories(&snapshot.packages),
            empty: !loading && items.is_empty(),
            items,
            filtered_count: derived.filtered_count,
            pagination: Pagination::new(derived.page, derived.total_pages),
            query,
            replace_url,
        }
    }
}
