use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

use crate::api_client::FetchSettings;
use crate::pipeline::PipelineSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub api_base: String,
    pub home_country: String,
    pub page_size: usize,
    pub fetch_timeout_secs: u64,
    pub package_limit: u32,
    pub destination_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests do not have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let page_size: usize = var("TRAVEL_FINDER_PAGE_SIZE", "8")
            .parse()
            .context("TRAVEL_FINDER_PAGE_SIZE must be a number")?;
        if page_size == 0 {
            bail!("TRAVEL_FINDER_PAGE_SIZE must be greater than 0");
        }

        Ok(Config {
            port: var("TRAVEL_FINDER_PORT", "18480")
                .parse()
                .context("TRAVEL_FINDER_PORT must be a valid port")?,
            host: var("TRAVEL_FINDER_HOST", "0.0.0.0"),
            api_base: var("TRAVEL_FINDER_API_BASE", "http://localhost:5000/api")
                .trim_end_matches('/')
                .to_string(),
            home_country: var("TRAVEL_FINDER_HOME_COUNTRY", "India"),
            page_size,
            fetch_timeout_secs: var("TRAVEL_FINDER_FETCH_TIMEOUT_SECS", "30")
                .parse()
                .context("TRAVEL_FINDER_FETCH_TIMEOUT_SECS must be a number")?,
            package_limit: var("TRAVEL_FINDER_PACKAGE_LIMIT", "1000")
                .parse()
                .context("TRAVEL_FINDER_PACKAGE_LIMIT must be a number")?,
            destination_limit: var("TRAVEL_FINDER_DESTINATION_LIMIT", "500")
                .parse()
                .context("TRAVEL_FINDER_DESTINATION_LIMIT must be a number")?,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            home_country: self.home_country.clone(),
            page_size: self.page_size,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: (self.fetch_timeout_secs > 0)
                .then(|| Duration::from_secs(self.fetch_timeout_secs)),
            package_limit: self.package_limit,
            destination_limit: self.destination_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.port, 18480);
        assert_eq!(config.api_base, "http://localhost:5000/api");
        assert_eq!(config.home_country, "India");
        assert_eq!(config.page_size, 8);
        assert_eq!(config.fetch_settings().timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.fetch_settings().package_limit, 1000);
        assert_eq!(config.fetch_settings().destination_limit, 500);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("TRAVEL_FINDER_API_BASE", "https://api.example.com/v1/"),
            ("TRAVEL_FINDER_HOME_COUNTRY", "Nepal"),
            ("TRAVEL_FINDER_PAGE_SIZE", "12"),
            ("TRAVEL_FINDER_FETCH_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.api_base, "https://api.example.com/v1");
        let settings = config.pipeline_settings();
        assert_eq!(settings.home_country, "Nepal");
        assert_eq!(settings.page_size, 12);
        assert_eq!(config.fetch_settings().timeout, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_with(&[("TRAVEL_FINDER_PORT", "not-a-port")]).is_err());
        assert!(config_with(&[("TRAVEL_FINDER_PAGE_SIZE", "0")]).is_err());
    }
}
