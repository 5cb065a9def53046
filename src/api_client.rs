use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::time::Duration;

use crate::catalog_types::{Destination, DestinationMap, Package};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected response shape from {0}")]
    UnexpectedShape(&'static str),
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Read-only access to the platform backend.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_packages(&self) -> CatalogResult<Vec<Package>>;
    async fn fetch_destinations(&self) -> CatalogResult<DestinationMap>;
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Option<Duration>,
    pub package_limit: u32,
    pub destination_limit: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            package_limit: 1000,
            destination_limit: 500,
        }
    }
}

#[derive(Clone)]
pub struct HttpCatalogSource {
    api_base: String,
    agent: ureq::Agent,
    package_limit: u32,
    destination_limit: u32,
}

impl HttpCatalogSource {
    pub fn new(api_base: impl Into<String>, settings: &FetchSettings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(settings.timeout)
            .build();
        let agent: ureq::Agent = config.into();
        let api_base: String = api_base.into();

        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            agent,
            package_limit: settings.package_limit,
            destination_limit: settings.destination_limit,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// ureq is blocking, so the request runs on tokio's blocking pool.
    async fn get_json(&self, path: &str, query: Vec<(&'static str, String)>) -> CatalogResult<Value> {
        let url = format!("{}{}", self.api_base, path);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || -> CatalogResult<Value> {
            debug!("GET {} {:?}", url, query);
            let mut request = agent.get(url.as_str());
            for (key, value) in &query {
                request = request.query(key, value);
            }
            let mut response = request.call()?;
            let body = response.body_mut().read_to_string()?;
            Ok(serde_json::from_str(&body)?)
        })
        .await
        .map_err(|e| CatalogError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_packages(&self) -> CatalogResult<Vec<Package>> {
        let body = self
            .get_json(
                "/package/get-packages",
                vec![
                    ("status", "active".to_string()),
                    ("page", "1".to_string()),
                    ("limit", self.package_limit.to_string()),
                ],
            )
            .await?;
        packages_from_response(&body)
    }

    async fn fetch_destinations(&self) -> CatalogResult<DestinationMap> {
        let body = self
            .get_json(
                "/destinations",
                vec![("limit", self.destination_limit.to_string())],
            )
            .await?;
        destinations_from_response(&body)
    }
}

/// Accepts `{packages}`, `{data: {packages}}` or a bare array.
pub fn packages_from_response(body: &Value) -> CatalogResult<Vec<Package>> {
    let records = body
        .get("packages")
        .or_else(|| body.get("data").and_then(|data| data.get("packages")))
        .or(Some(body))
        .and_then(Value::as_array)
        .ok_or(CatalogError::UnexpectedShape("package endpoint"))?;

    Ok(records.iter().map(Package::from_json).collect())
}

/// Accepts `{data: {items}}`, `{destinations}`, `{items}` or a bare array.
pub fn destinations_from_response(body: &Value) -> CatalogResult<DestinationMap> {
    let records = body
        .get("data")
        .and_then(|data| data.get("items"))
        .or_else(|| body.get("destinations"))
        .or_else(|| body.get("items"))
        .or(Some(body))
        .and_then(Value::as_array)
        .ok_or(CatalogError::UnexpectedShape("destination endpoint"))?;

    Ok(records
        .iter()
        .map(Destination::from_json)
        .filter(|destination| !destination.id.is_empty())
        .map(|destination| (destination.id.clone(), destination))
        .collect())
}
