// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Backend Capability Interface
//!
//! The backend is the execution and storage engine that owns agent sessions,
//! task records, listener profiles and uploaded objects. The core never holds
//! any of that state itself; it only issues calls through [`Backend`].
//!
//! | Capability | Used by |
//! |------------|---------|
//! | `resolve_listener_profile`, `generate_agent_artifact` | artifact generation |
//! | `dispatch_command` | command dispatch |
//! | `merge_hook_fragment` | hook correlation |
//! | `remove_agent_from_console`, `remove_agent`, `set_agent_*` | batch agent operations |
//! | `cancel_task`, `delete_task` | batch task operations |
//! | `retrieve_object`, `delete_object` | deferred commands, downloads |
//!
//! Implementations must be safe under concurrent invocation: several
//! operators and agents may hit the same task at the same time.
//!
//! Adapters live in `crate::infrastructure::backend`.

use async_trait::async_trait;

use crate::domain::agent::{ActingUser, AgentColor, AgentId, HookId, ObjectId, TaskId};
use crate::domain::command::CommandArguments;
use crate::domain::hook::{JobIndex, TaskHookFragment};

/// Listener profile resolved for artifact generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerProfile {
    /// Name and type of the listener the profile was resolved from.
    pub listener_name: String,
    pub listener_type: String,
    /// Profile label (watermark) baked into generated artifacts.
    pub label: String,
    pub profile: Vec<u8>,
}

/// Generated agent artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentArtifact {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Object previously stored in the backend object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Stored name, `<id>_<display name>` for downloads.
    pub name: String,
    pub content: Vec<u8>,
}

/// Arguments forwarded to [`Backend::dispatch_command`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub agent_name: String,
    pub agent_id: AgentId,
    pub acting_user: ActingUser,
    pub hook_id: HookId,
    pub command_line: String,
    pub ui_originated: bool,
    pub arguments: CommandArguments,
}

/// Backend domain errors. The `Display` text is what operators see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} not connected")]
    AgentNotConnected(AgentId),

    #[error("command rejected: {0}")]
    CommandRejected(String),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("hook {hook_id} does not belong to task {task_id}")]
    HookMismatch { task_id: TaskId, hook_id: HookId },

    #[error("job {job_index} of task {task_id} already completed")]
    JobAlreadyCompleted { task_id: TaskId, job_index: JobIndex },

    #[error("task {0} was cancelled")]
    TaskCancelled(TaskId),

    #[error("listener {0} not found")]
    ListenerNotFound(String),

    #[error("agent type {0} is not supported by this listener")]
    UnsupportedAgentType(String),

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

/// Capability surface of the execution and storage engine.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve the profile of a listener by name and type.
    async fn resolve_listener_profile(
        &self,
        listener_name: &str,
        listener_type: &str,
    ) -> Result<ListenerProfile, BackendError>;

    /// Build an agent artifact of `agent_type` against a listener profile.
    async fn generate_agent_artifact(
        &self,
        agent_type: &str,
        config: &str,
        profile: &ListenerProfile,
    ) -> Result<AgentArtifact, BackendError>;

    /// Queue a command for asynchronous execution on an agent.
    async fn dispatch_command(&self, request: DispatchRequest) -> Result<(), BackendError>;

    /// Merge one result fragment into the task record it belongs to.
    async fn merge_hook_fragment(
        &self,
        fragment: TaskHookFragment,
        job_index: JobIndex,
    ) -> Result<(), BackendError>;

    /// Hide an agent from operator consoles while keeping its session.
    async fn remove_agent_from_console(&self, agent_id: &AgentId) -> Result<(), BackendError>;

    async fn remove_agent(&self, agent_id: &AgentId) -> Result<(), BackendError>;

    async fn set_agent_tag(&self, agent_id: &AgentId, tag: &str) -> Result<(), BackendError>;

    async fn set_agent_mark(&self, agent_id: &AgentId, mark: &str) -> Result<(), BackendError>;

    async fn set_agent_color(&self, agent_id: &AgentId, color: &AgentColor) -> Result<(), BackendError>;

    /// Record the identity an agent currently runs as. Callers treat this as
    /// best-effort.
    async fn set_agent_impersonation(
        &self,
        agent_id: &AgentId,
        identity: &str,
        elevated: bool,
    ) -> Result<(), BackendError>;

    async fn cancel_task(&self, agent_id: &AgentId, task_id: &TaskId) -> Result<(), BackendError>;

    async fn delete_task(&self, agent_id: &AgentId, task_id: &TaskId) -> Result<(), BackendError>;

    async fn retrieve_object(&self, object_id: &ObjectId) -> Result<StoredObject, BackendError>;

    async fn delete_object(&self, object_id: &ObjectId) -> Result<(), BackendError>;
}
