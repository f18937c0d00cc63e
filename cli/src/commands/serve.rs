// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `serve` command

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use switchboard_core::domain::server_config::ServerConfigManifest;

use crate::daemon;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// HTTP API port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// HTTP API bind address (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

pub async fn handle_command(args: ServeArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(args, config_override)?;
    daemon::start_server(config).await
}

/// Load, override and validate the server configuration.
pub fn resolve_config(
    args: ServeArgs,
    config_override: Option<PathBuf>,
) -> Result<ServerConfigManifest> {
    let mut config = ServerConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;

    if let Some(port) = args.port {
        config.spec.server.port = port;
    }
    if let Some(host) = args.host {
        config.spec.server.bind_address = host;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}
