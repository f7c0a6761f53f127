//! # aqrobloomd — aqrobloom daemon
//!
//! Composition root that configures the facility engine and starts the
//! server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise structured logging
//! - Build the random source and the facility engine, then spawn it
//! - Build the axum router around the engine handle
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C), cancelling every engine timer
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use aqrobloom_adapter_http_axum::state::AppState;
use aqrobloom_app::engine::FacilityEngine;
use aqrobloom_app::runtime;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Engine
    let random = match config.facility.seed {
        Some(seed) => {
            tracing::info!(seed, "seeding random source");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let engine = FacilityEngine::new(config.facility_params(), random);
    let facility = runtime::spawn(engine);

    // HTTP
    let app = aqrobloom_adapter_http_axum::router::build(AppState::new(facility.clone()));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "aqrobloomd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(err) = facility.shutdown().await {
        tracing::warn!(%err, "facility engine already stopped");
    }
    tracing::info!("aqrobloomd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
