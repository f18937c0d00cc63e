// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Task Hook Correlation
//!
//! Accepts one result fragment for an already-dispatched task and hands it to
//! the backend merge logic. This layer only stamps the reporting user and
//! forwards; it never checks task existence, never suppresses fragments that
//! follow a completed one, and never buffers or retries. A backend failure is
//! returned so the reporting source can decide whether to resend.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::agent::{ActingUser, AgentId, HookId, TaskId};
use crate::domain::backend::{Backend, BackendError};
use crate::domain::hook::{JobIndex, MessageType, TaskHookFragment};

/// Fragment as reported by the execution side, before attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct HookReport {
    pub agent_id: AgentId,
    pub task_id: TaskId,
    pub hook_id: HookId,
    pub message_type: MessageType,
    pub message: String,
    pub clear_text: String,
    pub completed: bool,
}

impl HookReport {
    pub fn into_fragment(self, reporting_user: ActingUser) -> TaskHookFragment {
        TaskHookFragment {
            agent_id: self.agent_id,
            task_id: self.task_id,
            hook_id: self.hook_id,
            message_type: self.message_type,
            message: self.message,
            clear_text: self.clear_text,
            completed: self.completed,
            reporting_user,
        }
    }
}

#[async_trait]
pub trait HookCorrelationService: Send + Sync {
    async fn post_hook(
        &self,
        report: HookReport,
        job_index: JobIndex,
        reporting_user: ActingUser,
    ) -> Result<(), BackendError>;
}

pub struct StandardHookCorrelationService {
    backend: Arc<dyn Backend>,
}

impl StandardHookCorrelationService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl HookCorrelationService for StandardHookCorrelationService {
    async fn post_hook(
        &self,
        report: HookReport,
        job_index: JobIndex,
        reporting_user: ActingUser,
    ) -> Result<(), BackendError> {
        let fragment = report.into_fragment(reporting_user);
        let key = fragment.correlation_key();
        let completed = fragment.completed;

        match self.backend.merge_hook_fragment(fragment, job_index).await {
            Ok(()) => {
                metrics::counter!("switchboard_hook_fragments_total", "status" => "ok").increment(1);
                info!(
                    correlation = %key,
                    job_index = %job_index,
                    completed,
                    "Hook fragment forwarded"
                );
                Ok(())
            }
            Err(e) => {
                metrics::counter!("switchboard_hook_fragments_total", "status" => "failed").increment(1);
                warn!(
                    correlation = %key,
                    job_index = %job_index,
                    error = %e,
                    "Hook fragment rejected by backend"
                );
                Err(e)
            }
        }
    }
}
