use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog_types::{DestinationMap, Package};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Loaded,
    Error,
}

/// Immutable view of the catalog at one point in time. Collections are only
/// ever replaced as a whole.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub packages: Arc<Vec<Package>>,
    pub destinations: Arc<DestinationMap>,
    pub load_state: LoadState,
    pub error_banner: Option<String>,
    pub packages_loaded_at: Option<DateTime<Utc>>,
    pub destinations_loaded_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn loading() -> Self {
        Self {
            packages: Arc::new(Vec::new()),
            destinations: Arc::new(DestinationMap::new()),
            load_state: LoadState::Loading,
            error_banner: None,
            packages_loaded_at: None,
            destinations_loaded_at: None,
        }
    }

    pub fn loaded(packages: Vec<Package>, destinations: DestinationMap) -> Self {
        let now = Utc::now();
        Self {
            packages: Arc::new(packages),
            destinations: Arc::new(destinations),
            load_state: LoadState::Loaded,
            error_banner: None,
            packages_loaded_at: Some(now),
            destinations_loaded_at: Some(now),
        }
    }
}

/// Shared handle to the in-memory catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogSnapshot>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::from_snapshot(CatalogSnapshot::loading())
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn load_state(&self) -> LoadState {
        self.inner.read().await.load_state
    }

    /// Starts a new load. Previously loaded data stays visible until the new
    /// results replace it.
    pub async fn begin_loading(&self) {
        let mut snapshot = self.inner.write().await;
        snapshot.load_state = LoadState::Loading;
        snapshot.error_banner = None;
    }

    pub async fn replace_packages(&self, packages: Vec<Package>) {
        let mut snapshot = self.inner.write().await;
        snapshot.packages = Arc::new(packages);
        snapshot.packages_loaded_at = Some(Utc::now());
        snapshot.load_state = LoadState::Loaded;
        snapshot.error_banner = None;
    }

    pub async fn replace_destinations(&self, destinations: DestinationMap) {
        let mut snapshot = self.inner.write().await;
        snapshot.destinations = Arc::new(destinations);
        snapshot.destinations_loaded_at = Some(Utc::now());
    }

    /// Package load failed: show an empty, still interactive catalog with a
    /// banner.
    pub async fn fail_packages(&self, banner: impl Into<String>) {
        let mut snapshot = self.inner.write().await;
        snapshot.packages = Arc::new(Vec::new());
        snapshot.load_state = LoadState::Error;
        snapshot.error_banner = Some(banner.into());
    }
}
