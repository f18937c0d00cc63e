// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::agent::AgentId;
use crate::domain::backend::{AgentArtifact, Backend, BackendError};

/// Parameters of an agent artifact build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateAgentRequest {
    pub listener_name: String,
    pub listener_type: String,
    pub agent_type: String,
    /// Agent-specific build configuration, passed through untouched.
    pub config: String,
}

/// Single-target agent administration.
#[derive(Clone)]
pub struct AgentAdminService {
    backend: Arc<dyn Backend>,
}

impl AgentAdminService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Resolve the listener profile, then build an artifact against it.
    pub async fn generate_agent(&self, request: GenerateAgentRequest) -> Result<AgentArtifact, BackendError> {
        let profile = self
            .backend
            .resolve_listener_profile(&request.listener_name, &request.listener_type)
            .await?;

        let artifact = self
            .backend
            .generate_agent_artifact(&request.agent_type, &request.config, &profile)
            .await?;

        info!(
            listener = %request.listener_name,
            agent_type = %request.agent_type,
            file_name = %artifact.file_name,
            size = artifact.content.len(),
            "Agent artifact generated"
        );
        Ok(artifact)
    }

    /// Best-effort: a backend failure is logged and otherwise ignored.
    pub async fn set_impersonation(&self, agent_id: &AgentId, identity: &str, elevated: bool) {
        if let Err(e) = self
            .backend
            .set_agent_impersonation(agent_id, identity, elevated)
            .await
        {
            debug!(agent_id = %agent_id, error = %e, "Ignoring impersonation update failure");
        }
    }
}
