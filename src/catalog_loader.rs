use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api_client::CatalogSource;
use crate::catalog::Catalog;

pub const PACKAGE_ERROR_BANNER: &str = "Failed to load packages. Please reload the page to try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Result applied to the catalog, with the number of records.
    Applied(usize),
    Failed,
    /// Arrived after cancellation and was thrown away.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub packages: FetchOutcome,
    pub destinations: FetchOutcome,
}

/// Runs both fetches concurrently. Each result is applied as soon as it
/// arrives and independently of the other, so packages can be browsed before
/// destination names are known and a destination failure never hides
/// packages.
pub async fn load_catalog(
    source: &dyn CatalogSource,
    catalog: &Catalog,
    cancel: &CancellationToken,
) -> LoadOutcome {
    catalog.begin_loading().await;

    let packages = async {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return FetchOutcome::Discarded,
            result = source.fetch_packages() => result,
        };
        if cancel.is_cancelled() {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(packages) => {
                let count = packages.len();
                catalog.replace_packages(packages).await;
                info!("Loaded {} packages", count);
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                error!("Package fetch failed: {}", e);
                catalog.fail_packages(PACKAGE_ERROR_BANNER).await;
                FetchOutcome::Failed
            }
        }
    };

    let destinations = async {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return FetchOutcome::Discarded,
            result = source.fetch_destinations() => result,
        };
        if cancel.is_cancelled() {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(destinations) => {
                let count = destinations.len();
                catalog.replace_destinations(destinations).await;
                info!("Loaded {} destinations", count);
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                warn!("Destination fetch failed, showing raw destination ids: {}", e);
                FetchOutcome::Failed
            }
        }
    };

    let (packages, destinations) = tokio::join!(packages, destinations);

    if packages == FetchOutcome::Discarded || destinations == FetchOutcome::Discarded {
        warn!("Catalog load cancelled, late results discarded");
    }

    LoadOutcome {
        packages,
        destinations,
    }
}

/// Owns the catalog source and makes sure only the latest load can write to
/// the catalog: starting a reload cancels the one still in flight.
#[derive(Clone)]
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    catalog: Catalog,
    shutdown: CancellationToken,
    in_flight: Arc<Mutex<Option<CancellationToken>>>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>, catalog: Catalog, shutdown: CancellationToken) -> Self {
        Self {
            source,
            catalog,
            shutdown,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn reload(&self) -> LoadOutcome {
        let token = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(previous) = in_flight.take() {
                previous.cancel();
            }
            let token = self.shutdown.child_token();
            *in_flight = Some(token.clone());
            token
        };

        load_catalog(self.source.as_ref(), &self.catalog, &token).await
    }

    pub fn spawn_reload(&self) -> JoinHandle<LoadOutcome> {
        let loader = self.clone();
        tokio::spawn(async move { loader.reload().await })
    }
}
