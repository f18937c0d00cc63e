// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Server Configuration Types
//
// Kubernetes-style manifest (apiVersion/kind/metadata/spec) describing one
// Switchboard control server:
// - HTTP ingress bind address and port
// - Operator token table used by the authentication layer
// - Agent sessions seeded into the in-memory backend
// - Listener profiles preloaded into the in-memory backend
// - Backend hook merge policy
// - Logging and metrics settings

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::task::LateFragmentPolicy;

pub const API_VERSION: &str = "switchboard.io/v1";
pub const KIND: &str = "ServerConfig";

/// Top-level server configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfigManifest {
    /// API version (must be "switchboard.io/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ServerConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: ServerConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable server name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigSpec {
    #[serde(default)]
    pub server: HttpConfig,

    /// Operators allowed to call the API, keyed by bearer token
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,

    /// Agent sessions known at startup
    #[serde(default)]
    pub agents: Vec<AgentConfig>,

    /// Listener profiles available for agent artifact generation
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub username: String,

    /// Bearer token. Supports "env:VAR_NAME" to read from the environment.
    pub token: String,
}

impl OperatorConfig {
    /// Token with `env:` indirection resolved.
    pub fn resolved_token(&self) -> Option<String> {
        match self.token.strip_prefix("env:") {
            Some(var) => std::env::var(var).ok(),
            None => Some(self.token.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Routing key operators address commands to
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub agent_type: String,

    #[serde(default = "default_connected")]
    pub connected: bool,
}

fn default_connected() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub listener_type: String,

    /// Profile label stamped into generated artifacts
    pub label: String,

    /// Raw profile file handed to artifact generation
    pub profile_path: PathBuf,

    /// Agent types this listener can build; empty means any
    #[serde(default)]
    pub agent_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub late_fragment_policy: LateFragmentPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub metrics_enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    4321
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_metrics_port() -> u16 {
    9464
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl Default for ServerConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "switchboard".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
            },
            spec: ServerConfigSpec::default(),
        }
    }
}

impl ServerConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. SWITCHBOARD_CONFIG_PATH environment variable
    /// 2. ./switchboard-config.yaml (working directory)
    /// 3. ~/.switchboard/config.yaml (user home)
    /// 4. /etc/switchboard/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SWITCHBOARD_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./switchboard-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".switchboard").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/switchboard/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails hard when missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (container deployments)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SWITCHBOARD_BIND_ADDRESS") {
            tracing::info!("Environment override: SWITCHBOARD_BIND_ADDRESS={}", val);
            self.spec.server.bind_address = val;
        }

        if let Ok(val) = std::env::var("SWITCHBOARD_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: SWITCHBOARD_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!("Invalid value for SWITCHBOARD_PORT: '{}'. Ignoring.", val);
                }
            }
        }

        if let Ok(val) = std::env::var("SWITCHBOARD_LATE_FRAGMENT_POLICY") {
            match val.parse::<LateFragmentPolicy>() {
                Ok(policy) => {
                    tracing::info!("Environment override: SWITCHBOARD_LATE_FRAGMENT_POLICY={:?}", policy);
                    self.spec.backend.late_fragment_policy = policy;
                }
                Err(e) => {
                    tracing::warn!("Invalid value for SWITCHBOARD_LATE_FRAGMENT_POLICY: {}. Ignoring.", e);
                }
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port cannot be 0");
        }

        let mut tokens = HashSet::new();
        for operator in &self.spec.operators {
            if operator.username.is_empty() {
                anyhow::bail!("Operator username cannot be empty");
            }
            if operator.token.is_empty() {
                anyhow::bail!("Operator token cannot be empty for: {}", operator.username);
            }
            if !tokens.insert(operator.token.as_str()) {
                anyhow::bail!("Duplicate operator token for: {}", operator.username);
            }
        }

        let mut agent_ids = HashSet::new();
        for agent in &self.spec.agents {
            if agent.id.is_empty() {
                anyhow::bail!("Agent id cannot be empty");
            }
            if !agent_ids.insert(agent.id.as_str()) {
                anyhow::bail!("Duplicate agent id: {}", agent.id);
            }
        }

        for listener in &self.spec.listeners {
            if listener.name.is_empty() {
                anyhow::bail!("Listener name cannot be empty");
            }
            if listener.listener_type.is_empty() {
                anyhow::bail!("Listener type cannot be empty for: {}", listener.name);
            }
        }

        match self.spec.observability.log_format.as_str() {
            "compact" | "json" => {}
            other => anyhow::bail!("Invalid log_format: '{}'. Must be 'compact' or 'json'", other),
        }

        Ok(())
    }
}
