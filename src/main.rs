//! Typhoon Tracker - nearest tropical cyclone monitor
//!
//! Polls a severe weather bulletin page, picks the cyclone nearest to a
//! reference point and serves the result over HTTP.

mod bulletin;
mod config;
mod fetch;
mod geo;
mod scheduler;
mod selection;
mod web;

use config::ServerConfig;
use fetch::HttpSource;
use scheduler::{PollCoordinator, Poller};
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("typhoon_tracker=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    let reference = cfg.reference_point();
    tracing::info!("Starting Typhoon Tracker on port {}...", cfg.http_port);
    tracing::info!("Polling {}", cfg.bulletin_url);
    tracing::info!(
        "Reference point ({:.4}, {:.4}), interval {}m, smart polling {} (idle {}m)",
        reference.latitude,
        reference.longitude,
        cfg.base_interval_minutes,
        if cfg.smart_polling_enabled { "on" } else { "off" },
        cfg.idle_interval_minutes
    );

    let source = HttpSource::new()?;
    let coordinator = Arc::new(PollCoordinator::new(source, cfg.poll_settings()));

    // Start polling
    let poller = Poller::new(coordinator.clone());
    poller.start().await;

    // Serve until Ctrl-C, then stop polling
    let server = Server::new(&cfg, coordinator);
    let served = server.start().await;

    poller.stop().await;
    served?;

    Ok(())
}
