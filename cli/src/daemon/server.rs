// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Control server HTTP loop

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use switchboard_core::domain::server_config::ServerConfigManifest;
use switchboard_core::presentation::{app, AppState, OperatorDirectory};

use super::{build_backend, install_metrics_exporter};

pub async fn start_server(config: ServerConfigManifest) -> Result<()> {
    info!(
        name = %config.metadata.name,
        late_fragment_policy = ?config.spec.backend.late_fragment_policy,
        "Switchboard starting"
    );

    if config.spec.observability.metrics_enabled {
        install_metrics_exporter(config.spec.observability.metrics_port)?;
    }

    let backend = build_backend(&config)?;
    let operators = OperatorDirectory::from_config(&config.spec.operators);
    if operators.is_empty() {
        error!("No operators configured; every API request will be rejected");
    } else {
        info!(operators = operators.len(), "Operator directory loaded");
    }

    let router = app(AppState::from_backend(backend), Arc::new(operators));

    let addr = format!(
        "{}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Switchboard listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Switchboard shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
