use serde::Deserialize;
use std::sync::Arc;
use warp::{reject, Filter, Rejection, Reply};

use crate::analytics;
use crate::catalog::{Catalog, CatalogSnapshot};
use crate::catalog_loader::{CatalogLoader, FetchOutcome};
use crate::discovery::DiscoverySession;
use crate::filter_state::FilterEdit;
use crate::pipeline::PipelineSettings;
use crate::query_sync;
use crate::view::{DiscoveryView, ViewMode};
use crate::warp_helpers::{raw_query, with_catalog, with_loader, with_settings, ValidationError};

#[derive(Debug, Deserialize)]
pub struct FilterEditRequest {
    /// The search part of the browser URL, with or without `?`.
    #[serde(default)]
    pub query: String,
    pub view: Option<String>,
    #[serde(default)]
    pub edits: Vec<FilterEdit>,
}

#[derive(Debug, serde::Serialize)]
pub struct ReloadResponse {
    pub packages: String,
    pub destinations: String,
}

fn parse_view_mode(value: Option<&str>) -> Result<ViewMode, ValidationError> {
    match value {
        None => Ok(ViewMode::default()),
        Some(raw) => raw.parse().map_err(|_| ValidationError {
            message: format!("Unknown view mode '{}', expected 'grid' or 'list'", raw),
        }),
    }
}

/// Renders the discovery view for a URL query string.
pub fn discovery_for_query(
    raw: &str,
    snapshot: &CatalogSnapshot,
    settings: &PipelineSettings,
) -> Result<DiscoveryView, ValidationError> {
    let params = query_sync::query_params(raw);
    let view_mode = parse_view_mode(params.get("view").map(String::as_str))?;
    let mut session = DiscoverySession::mount(raw);
    session.set_view_mode(view_mode);
    Ok(session.render(snapshot, settings))
}

/// Applies browser edits on top of the URL the page currently shows.
pub fn discovery_after_edits(
    request: FilterEditRequest,
    snapshot: &CatalogSnapshot,
    settings: &PipelineSettings,
) -> Result<DiscoveryView, ValidationError> {
    let view_mode = parse_view_mode(request.view.as_deref())?;
    let mut session = DiscoverySession::mount(&request.query);
    session.set_view_mode(view_mode);
    session.apply_all(request.edits);
    Ok(session.render(snapshot, settings))
}

pub async fn list_packages(
    raw: String,
    catalog: Catalog,
    settings: Arc<PipelineSettings>,
) -> Result<impl Reply, Rejection> {
    let snapshot = catalog.snapshot().await;
    let view = discovery_for_query(&raw, &snapshot, &settings).map_err(reject::custom)?;
    Ok(warp::reply::json(&view))
}

pub async fn edit_filters(
    request: FilterEditRequest,
    catalog: Catalog,
    settings: Arc<PipelineSettings>,
) -> Result<impl Reply, Rejection> {
    let snapshot = catalog.snapshot().await;
    let view = discovery_after_edits(request, &snapshot, &settings).map_err(reject::custom)?;
    Ok(warp::reply::json(&view))
}

pub async fn get_stats(
    catalog: Catalog,
    settings: Arc<PipelineSettings>,
) -> Result<impl Reply, Rejection> {
    let snapshot = catalog.snapshot().await;
    let stats = analytics::catalog_stats(
        &snapshot.packages,
        &snapshot.destinations,
        &settings.home_country,
    );
    Ok(warp::reply::json(&stats))
}

fn describe(outcome: FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Applied(count) => format!("loaded {}", count),
        FetchOutcome::Failed => "failed".to_string(),
        FetchOutcome::Discarded => "discarded".to_string(),
    }
}

pub async fn reload_catalog(loader: CatalogLoader) -> Result<impl Reply, Rejection> {
    log::info!("Catalog reload requested");
    let outcome = loader.reload().await;
    Ok(warp::reply::json(&ReloadResponse {
        packages: describe(outcome.packages),
        destinations: describe(outcome.destinations),
    }))
}

pub fn build_package_routes(
    loader: CatalogLoader,
    settings: Arc<PipelineSettings>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let catalog = loader.catalog().clone();

    let api_packages = warp::path!("api" / "packages")
        .and(warp::get())
        .and(raw_query())
        .and(with_catalog(catalog.clone()))
        .and(with_settings(settings.clone()))
        .and_then(list_packages);

    let api_filters = warp::path!("api" / "packages" / "filters")
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json::<FilterEditRequest>())
        .and(with_catalog(catalog.clone()))
        .and(with_settings(settings.clone()))
        .and_then(edit_filters);

    let api_stats = warp::path!("api" / "stats")
        .and(warp::get())
        .and(with_catalog(catalog))
        .and(with_settings(settings))
        .and_then(get_stats);

    let api_reload = warp::path!("api" / "catalog" / "reload")
        .and(warp::post())
        .and(with_loader(loader))
        .and_then(reload_catalog);

    api_packages.or(api_filters).or(api_stats).or(api_reload)
}
