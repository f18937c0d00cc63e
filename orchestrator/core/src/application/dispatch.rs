// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Command Dispatch
//!
//! Validates, resolves and forwards one operator command to the backend.
//!
//! ```text
//! DeferredCommandReference ──retrieve_object──▶ bytes ──serde_json──▶ CommandRequest
//!                                                                        │
//! CommandRequest ────────────────────────────────────────────────────────┤
//!                                                                        ▼
//!                                          parse arguments (tolerant) ──▶ Backend::dispatch_command
//! ```
//!
//! A successful dispatch carries no result; the command output comes back
//! later through the hook path (`crate::application::hook`).

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::agent::ActingUser;
use crate::domain::backend::{Backend, BackendError, DispatchRequest};
use crate::domain::command::{CommandArguments, CommandRequest, DeferredCommandReference};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The deferred payload could not be fetched from object storage.
    #[error("{0}")]
    Resolve(BackendError),

    /// The deferred payload is not a command request.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The backend refused or failed the dispatch.
    #[error("{0}")]
    Backend(BackendError),
}

#[async_trait]
pub trait CommandDispatchService: Send + Sync {
    /// Forward a command to the backend for asynchronous execution.
    async fn dispatch(&self, request: CommandRequest, acting_user: ActingUser) -> Result<(), DispatchError>;

    /// Resolve a pre-staged command body, then dispatch it.
    async fn dispatch_deferred(
        &self,
        reference: DeferredCommandReference,
        acting_user: ActingUser,
    ) -> Result<(), DispatchError>;
}

pub struct StandardCommandDispatchService {
    backend: Arc<dyn Backend>,
}

impl StandardCommandDispatchService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Malformed argument JSON never blocks a command; the command line alone
    /// may be enough for the agent.
    fn tolerant_arguments(request: &CommandRequest) -> CommandArguments {
        match request.parse_arguments() {
            Ok(arguments) => arguments,
            Err(e) => {
                debug!(
                    agent_id = %request.agent_id,
                    error = %e,
                    "Error parsing command arguments, dispatching with empty arguments"
                );
                CommandArguments::new()
            }
        }
    }
}

#[async_trait]
impl CommandDispatchService for StandardCommandDispatchService {
    async fn dispatch(&self, request: CommandRequest, acting_user: ActingUser) -> Result<(), DispatchError> {
        let arguments = Self::tolerant_arguments(&request);

        let dispatch = DispatchRequest {
            agent_name: request.agent_name,
            agent_id: request.agent_id,
            acting_user,
            hook_id: request.hook_id,
            command_line: request.command_line,
            ui_originated: request.ui_originated,
            arguments,
        };

        let agent_id = dispatch.agent_id.clone();
        let hook_id = dispatch.hook_id.clone();
        let user = dispatch.acting_user.clone();

        match self.backend.dispatch_command(dispatch).await {
            Ok(()) => {
                metrics::counter!("switchboard_commands_dispatched_total", "status" => "ok").increment(1);
                info!(
                    agent_id = %agent_id,
                    hook_id = %hook_id,
                    user = %user,
                    "Command dispatched"
                );
                Ok(())
            }
            Err(e) => {
                metrics::counter!("switchboard_commands_dispatched_total", "status" => "failed").increment(1);
                warn!(agent_id = %agent_id, user = %user, error = %e, "Command dispatch failed");
                Err(DispatchError::Backend(e))
            }
        }
    }

    async fn dispatch_deferred(
        &self,
        reference: DeferredCommandReference,
        acting_user: ActingUser,
    ) -> Result<(), DispatchError> {
        let object = self
            .backend
            .retrieve_object(&reference.object_id)
            .await
            .map_err(|e| {
                warn!(object_id = %reference.object_id, error = %e, "Deferred command could not be resolved");
                DispatchError::Resolve(e)
            })?;

        let request: CommandRequest = serde_json::from_slice(&object.content).map_err(|e| {
            warn!(object_id = %reference.object_id, error = %e, "Deferred command payload is malformed");
            DispatchError::Decode(e)
        })?;

        debug!(
            object_id = %reference.object_id,
            agent_id = %request.agent_id,
            "Deferred command resolved"
        );

        self.dispatch(request, acting_user).await
    }
}
