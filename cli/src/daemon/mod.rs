// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Control server bootstrap
//!
//! Handles:
//! - Backend construction from configuration
//! - Agent session seeding
//! - Listener profile loading
//! - Prometheus exporter installation
//! - Graceful shutdown

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use switchboard_core::domain::backend::ListenerProfile;
use switchboard_core::domain::server_config::{ListenerConfig, ServerConfigManifest};
use switchboard_core::infrastructure::backend::{AgentSession, InMemoryBackend};

pub mod server;

pub use server::start_server;

/// Build the in-memory backend, seed the configured agent sessions and
/// register every configured listener.
pub fn build_backend(config: &ServerConfigManifest) -> Result<Arc<InMemoryBackend>> {
    let backend = InMemoryBackend::new(config.spec.backend.late_fragment_policy);

    for agent in &config.spec.agents {
        let mut session = AgentSession::new(agent.id.as_str(), agent.name.as_str(), agent.agent_type.as_str());
        session.connected = agent.connected;
        backend.register_agent(session);
    }

    for listener in &config.spec.listeners {
        let profile = load_listener_profile(listener)?;
        backend.register_listener(profile, listener.agent_types.clone());
        info!(
            listener = %listener.name,
            listener_type = %listener.listener_type,
            "Listener registered"
        );
    }

    Ok(Arc::new(backend))
}

/// Read a listener's profile bytes from disk.
pub fn load_listener_profile(listener: &ListenerConfig) -> Result<ListenerProfile> {
    let profile = std::fs::read(&listener.profile_path).with_context(|| {
        format!(
            "Failed to read profile for listener '{}' at {:?}",
            listener.name, listener.profile_path
        )
    })?;

    Ok(ListenerProfile {
        listener_name: listener.name.clone(),
        listener_type: listener.listener_type.clone(),
        label: listener.label.clone(),
        profile,
    })
}

/// Serve Prometheus metrics on `0.0.0.0:<port>`.
pub fn install_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
