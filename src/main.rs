// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fitlog API Server
//!
//! Serves run folders, lift folders and the weight log on top of Firestore
//! and Firebase Authentication (or in-process stores for local development).

use fitlog::{
    config::{Backend, Config},
    db::{DocumentStore, FirestoreDb, MemoryStore},
    identity::{IdentityProvider, IdentityToolkitClient, MemoryIdentity},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.backend, "Starting fitlog API");

    let (store, identity): (Arc<dyn DocumentStore>, Arc<dyn IdentityProvider>) =
        match config.backend {
            Backend::Firebase => {
                let db = FirestoreDb::new(&config.gcp_project_id).await?;
                let identity = IdentityToolkitClient::new(config.firebase_api_key.clone());
                (Arc::new(db), Arc::new(identity))
            }
            Backend::Memory => {
                tracing::warn!("Using in-memory backends; data is lost on restart");
                (Arc::new(MemoryStore::new()), Arc::new(MemoryIdentity::new(true)))
            }
        };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, identity));

    // Build router
    let app = fitlog::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitlog=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
