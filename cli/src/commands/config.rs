// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use switchboard_core::domain::server_config::ServerConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./switchboard-config.yaml)
        #[arg(short, long, default_value = "./switchboard-config.yaml")]
        output: PathBuf,

        /// Include sample operators and listeners
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = ServerConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. SWITCHBOARD_CONFIG_PATH: {}",
            std::env::var("SWITCHBOARD_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./switchboard-config.yaml");
        println!("  4. ~/.switchboard/config.yaml");
        println!("  5. /etc/switchboard/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Server:".bold());
    println!("  Name: {}", config.metadata.name);
    println!(
        "  Listen: {}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    println!(
        "  Late fragments: {:?}",
        config.spec.backend.late_fragment_policy
    );
    println!();

    println!("{}", "Operators:".bold());
    if config.spec.operators.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for operator in &config.spec.operators {
        // Tokens are never printed.
        let source = if operator.token.starts_with("env:") {
            operator.token.as_str()
        } else {
            "(inline)"
        };
        println!("  {} token: {}", operator.username.bold(), source);
    }
    println!();

    println!("{}", "Agents:".bold());
    if config.spec.agents.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for agent in &config.spec.agents {
        let state = if agent.connected {
            "connected".green()
        } else {
            "disconnected".dimmed()
        };
        println!("  {} {} ({}) {}", agent.id.bold(), agent.name, agent.agent_type, state);
    }
    println!();

    println!("{}", "Listeners:".bold());
    if config.spec.listeners.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for listener in &config.spec.listeners {
        println!("  {} ({})", listener.name.bold(), listener.listener_type);
        println!("    Profile: {}", listener.profile_path.display());
        if !listener.agent_types.is_empty() {
            println!("    Agent types: {}", listener.agent_types.join(", "));
        }
    }
    println!();

    println!("{}", "Observability:".bold());
    println!(
        "  Logs: {} ({})",
        config.spec.observability.log_level, config.spec.observability.log_format
    );
    if config.spec.observability.metrics_enabled {
        println!("  Metrics port: {}", config.spec.observability.metrics_port);
    } else {
        println!("  Metrics: {}", "disabled".dimmed());
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ServerConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    if with_examples {
        std::fs::write(&output, include_str!("../../templates/config-with-examples.yaml"))
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    } else {
        ServerConfigManifest::default()
            .to_yaml_file(&output)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    }

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
