pub mod analytics;
pub mod api_client;
pub mod catalog;
pub mod catalog_loader;
pub mod catalog_types;
pub mod config;
pub mod discovery;
pub mod filter_state;
pub mod handlers_health;
pub mod handlers_packages;
pub mod handlers_static;
pub mod pipeline;
pub mod query_sync;
pub mod view;
pub mod warp_helpers;
