use serde_json::json;
use std::convert::Infallible;
use warp::{reject, Filter, Rejection, Reply};

use crate::catalog::{Catalog, LoadState};
use crate::warp_helpers::{with_catalog, CatalogUnavailable};

pub async fn health_check() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn ready_check(catalog: Catalog) -> Result<impl Reply, Rejection> {
    let snapshot = catalog.snapshot().await;
    match snapshot.load_state {
        LoadState::Loaded => Ok(warp::reply::json(&json!({
            "status": "ready",
            "packages": snapshot.packages.len(),
            "destinations": snapshot.destinations.len(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))),
        LoadState::Loading => Err(reject::custom(CatalogUnavailable {
            message: "Catalog is still loading".to_string(),
        })),
        LoadState::Error => {
            log::error!("Readiness check failed: package catalog unavailable");
            Err(reject::custom(CatalogUnavailable {
                message: "Package catalog failed to load".to_string(),
            }))
        }
    }
}

pub fn build_health_routes(
    catalog: Catalog,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let health = warp::path("health").and(warp::get()).and_then(health_check);

    let ready = warp::path("ready")
        .and(warp::get())
        .and(with_catalog(catalog))
        .and_then(ready_check);

    health.or(ready)
}
