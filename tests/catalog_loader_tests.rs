use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use travel_finder::api_client::{CatalogError, CatalogResult, CatalogSource};
use travel_finder::catalog::{Catalog, LoadState};
use travel_finder::catalog_loader::{
    load_catalog, CatalogLoader, FetchOutcome, PACKAGE_ERROR_BANNER,
};
use travel_finder::catalog_types::{Destination, DestinationMap, Package};

/// Canned backend with per-endpoint delays and failures.
struct FakeSource {
    fail_packages: bool,
    fail_destinations: bool,
    package_delay: Duration,
    destination_delay: Duration,
}

impl FakeSource {
    fn healthy() -> Self {
        Self {
            fail_packages: false,
            fail_destinations: false,
            package_delay: Duration::ZERO,
            destination_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn fetch_packages(&self) -> CatalogResult<Vec<Package>> {
        tokio::time::sleep(self.package_delay).await;
        if self.fail_packages {
            return Err(CatalogError::UnexpectedShape("package endpoint"));
        }
        Ok(vec![
            Package::from_json(&json!({"_id": "p1", "title": "Goa Beach", "destination": "goa", "status": "active"})),
            Package::from_json(&json!({"_id": "p2", "title": "Paris", "destination": "paris", "status": "active"})),
        ])
    }

    async fn fetch_destinations(&self) -> CatalogResult<DestinationMap> {
        tokio::time::sleep(self.destination_delay).await;
        if self.fail_destinations {
            return Err(CatalogError::TaskFailed("connection reset".to_string()));
        }
        let goa = Destination::from_json(&json!({"_id": "goa", "place": "Goa", "country": "India"}));
        Ok([(goa.id.clone(), goa)].into_iter().collect())
    }
}

#[tokio::test]
async fn test_load_applies_both_collections() {
    let catalog = Catalog::new();
    let outcome = load_catalog(&FakeSource::healthy(), &catalog, &CancellationToken::new()).await;

    assert_eq!(outcome.packages, FetchOutcome::Applied(2));
    assert_eq!(outcome.destinations, FetchOutcome::Applied(1));

    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.load_state, LoadState::Loaded);
    assert_eq!(snapshot.packages.len(), 2);
    assert!(snapshot.destinations.contains_key("goa"));
    assert!(snapshot.error_banner.is_none());
}

#[tokio::test]
async fn test_destination_failure_is_silent() {
    let source = FakeSource {
        fail_destinations: true,
        ..FakeSource::healthy()
    };
    let catalog = Catalog::new();
    let outcome = load_catalog(&source, &catalog, &CancellationToken::new()).await;

    assert_eq!(outcome.packages, FetchOutcome::Applied(2));
    assert_eq!(outcome.destinations, FetchOutcome::Failed);

    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.load_state, LoadState::Loaded);
    assert!(snapshot.error_banner.is_none());
    assert!(snapshot.destinations.is_empty());
}

#[tokio::test]
async fn test_package_failure_shows_banner_but_keeps_destinations() {
    let source = FakeSource {
        fail_packages: true,
        ..FakeSource::healthy()
    };
    let catalog = Catalog::new();
    let outcome = load_catalog(&source, &catalog, &CancellationToken::new()).await;

    assert_eq!(outcome.packages, FetchOutcome::Failed);
    assert_eq!(outcome.destinations, FetchOutcome::Applied(1));

    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.load_state, LoadState::Error);
    assert_eq!(snapshot.error_banner.as_deref(), Some(PACKAGE_ERROR_BANNER));
    assert!(snapshot.packages.is_empty());
    assert_eq!(snapshot.destinations.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetches_run_concurrently() {
    let source = FakeSource {
        package_delay: Duration::from_secs(5),
        destination_delay: Duration::from_secs(5),
        ..FakeSource::healthy()
    };
    let catalog = Catalog::new();

    let started = tokio::time::Instant::now();
    load_catalog(&source, &catalog, &CancellationToken::new()).await;

    // Sequential fetches would take ten seconds.
    assert!(started.elapsed() < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_packages_visible_before_destinations_arrive() {
    let source = Arc::new(FakeSource {
        destination_delay: Duration::from_secs(60),
        ..FakeSource::healthy()
    });
    let catalog = Catalog::new();

    let load = {
        let catalog = catalog.clone();
        let source = source.clone();
        tokio::spawn(async move { load_catalog(source.as_ref(), &catalog, &CancellationToken::new()).await })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    let snapshot = catalog.snapshot().await;
    assert_eq!(snapshot.packages.len(), 2);
    assert!(snapshot.destinations.is_empty());

    let outcome = load.await.unwrap();
    assert_eq!(outcome.destinations, FetchOutcome::Applied(1));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_load_discards_late_results() {
    let source = FakeSource {
        package_delay: Duration::from_secs(10),
        destination_delay: Duration::from_secs(10),
        ..FakeSource::healthy()
    };
    let catalog = Catalog::new();
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        })
    };

    let outcome = load_catalog(&source, &catalog, &cancel).await;
    canceller.await.unwrap();

    assert_eq!(outcome.packages, FetchOutcome::Discarded);
    assert_eq!(outcome.destinations, FetchOutcome::Discarded);

    let snapshot = catalog.snapshot().await;
    assert!(snapshot.packages.is_empty());
    assert!(snapshot.destinations.is_empty());
}

#[tokio::test]
async fn test_loader_shutdown_discards_reload() {
    let shutdown = CancellationToken::new();
    let loader = CatalogLoader::new(Arc::new(FakeSource::healthy()), Catalog::new(), shutdown.clone());

    shutdown.cancel();
    let outcome = loader.reload().await;

    assert_eq!(outcome.packages, FetchOutcome::Discarded);
    assert!(loader.catalog().snapshot().await.packages.is_empty());
}

#[tokio::test]
async fn test_loader_reload_fills_catalog() {
    let loader = CatalogLoader::new(
        Arc::new(FakeSource::healthy()),
        Catalog::new(),
        CancellationToken::new(),
    );

    let outcome = loader.spawn_reload().await.unwrap();
    assert_eq!(outcome.packages, FetchOutcome::Applied(2));
    assert_eq!(loader.catalog().load_state().await, LoadState::Loaded);
}
