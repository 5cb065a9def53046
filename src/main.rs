use anyhow::{bail, Context};
use log::{error, info};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warp::Filter;

use travel_finder::api_client::HttpCatalogSource;
use travel_finder::catalog::Catalog;
use travel_finder::catalog_loader::CatalogLoader;
use travel_finder::config::Config;
use travel_finder::handlers_health::build_health_routes;
use travel_finder::handlers_packages::build_package_routes;
use travel_finder::handlers_static::build_static_routes;
use travel_finder::warp_helpers::{cors, handle_rejection};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    info!("Starting Travel Finder on {}", addr);
    info!("Backend API: {}", config.api_base);
    info!("Home country: {}", config.home_country);

    if !is_port_available(addr) {
        error!(
            "Port {} is already in use. Stop the other process or set TRAVEL_FINDER_PORT.",
            config.port
        );
        bail!("Port {} is already in use", config.port);
    }

    let shutdown = CancellationToken::new();
    let source = Arc::new(HttpCatalogSource::new(
        config.api_base.clone(),
        &config.fetch_settings(),
    ));
    let loader = CatalogLoader::new(source, Catalog::new(), shutdown.clone());

    // Serve immediately; the page shows its loading state until the first
    // load lands.
    loader.spawn_reload();

    let settings = Arc::new(config.pipeline_settings());

    let routes = build_health_routes(loader.catalog().clone())
        .or(build_package_routes(loader.clone(), settings))
        .or(build_static_routes())
        .with(cors())
        .with(warp::log("travel_finder"))
        .recover(handle_rejection);

    info!("Listening on http://localhost:{}", config.port);

    tokio::select! {
        _ = warp::serve(routes).run(addr) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down, discarding in-flight catalog loads");
            shutdown.cancel();
        }
    }

    Ok(())
}

fn is_port_available(addr: SocketAddr) -> bool {
    TcpListener::bind(addr).is_ok()
}
