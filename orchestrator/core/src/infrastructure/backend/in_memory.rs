// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! In-memory [`Backend`] adapter.
//!
//! Keeps agent sessions, task records, listener profiles and stored objects in
//! `parking_lot` guarded maps. Locks are never held across an `.await`.
//! Used by the `switchboard serve` daemon and by tests; state is lost on
//! restart.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::agent::{AgentColor, AgentId, ObjectId, TaskId};
use crate::domain::backend::{
    AgentArtifact, Backend, BackendError, DispatchRequest, ListenerProfile, StoredObject,
};
use crate::domain::hook::{JobIndex, TaskHookFragment};
use crate::domain::task::{LateFragmentPolicy, MergeDisposition, TaskRecord};

/// Live agent session as seen by operators.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSession {
    pub id: AgentId,
    pub name: String,
    pub agent_type: String,
    pub connected: bool,
    /// Cleared by a console-only removal.
    pub visible: bool,
    pub tag: String,
    pub mark: String,
    pub color: AgentColor,
    pub impersonated: Option<String>,
    pub elevated: bool,
}

impl AgentSession {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            agent_type: agent_type.into(),
            connected: true,
            visible: true,
            tag: String::new(),
            mark: String::new(),
            color: AgentColor::default(),
            impersonated: None,
            elevated: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Listener {
    profile: ListenerProfile,
    agent_types: Vec<String>,
}

impl Listener {
    fn is(&self, name: &str, listener_type: &str) -> bool {
        self.profile.listener_name == name && self.profile.listener_type == listener_type
    }
}

type TaskKey = (AgentId, TaskId);

pub struct InMemoryBackend {
    agents: RwLock<HashMap<AgentId, AgentSession>>,
    tasks: RwLock<HashMap<TaskKey, TaskRecord>>,
    listeners: RwLock<Vec<Listener>>,
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    late_fragment_policy: LateFragmentPolicy,
}

impl InMemoryBackend {
    pub fn new(late_fragment_policy: LateFragmentPolicy) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            objects: RwLock::new(HashMap::new()),
            late_fragment_policy,
        }
    }

    /// Register (or replace) an agent session.
    pub fn register_agent(&self, session: AgentSession) {
        info!(agent_id = %session.id, name = %session.name, "Agent session registered");
        self.agents.write().insert(session.id.clone(), session);
    }

    pub fn set_connected(&self, agent_id: &AgentId, connected: bool) -> Result<(), BackendError> {
        self.with_agent(agent_id, |agent| agent.connected = connected)
    }

    /// Register (or replace) a listener profile, keyed by its name and type.
    /// An empty `agent_types` accepts any type.
    pub fn register_listener(&self, profile: ListenerProfile, agent_types: Vec<String>) {
        let mut listeners = self.listeners.write();
        listeners.retain(|l| !l.is(&profile.listener_name, &profile.listener_type));
        listeners.push(Listener { profile, agent_types });
    }

    /// Store an object under a fresh id. The stored name is `<id>_<name>`.
    pub fn store_object(&self, name: &str, content: Vec<u8>) -> ObjectId {
        let id = ObjectId::new(short_id());
        let stored = StoredObject {
            name: format!("{}_{}", id, name),
            content,
        };
        self.objects.write().insert(id.clone(), stored);
        id
    }

    pub fn agent(&self, agent_id: &AgentId) -> Option<AgentSession> {
        self.agents.read().get(agent_id).cloned()
    }

    pub fn task(&self, agent_id: &AgentId, task_id: &TaskId) -> Option<TaskRecord> {
        self.tasks
            .read()
            .get(&(agent_id.clone(), task_id.clone()))
            .cloned()
    }

    /// Tasks of one agent, oldest first.
    pub fn tasks_for(&self, agent_id: &AgentId) -> Vec<TaskRecord> {
        let mut tasks: Vec<TaskRecord> = self
            .tasks
            .read()
            .values()
            .filter(|t| &t.agent_id == agent_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        tasks
    }

    fn with_agent<R>(
        &self,
        agent_id: &AgentId,
        f: impl FnOnce(&mut AgentSession) -> R,
    ) -> Result<R, BackendError> {
        let mut agents = self.agents.write();
        let agent = agents
            .get_mut(agent_id)
            .ok_or_else(|| BackendError::AgentNotFound(agent_id.clone()))?;
        Ok(f(agent))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(LateFragmentPolicy::default())
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn resolve_listener_profile(
        &self,
        listener_name: &str,
        listener_type: &str,
    ) -> Result<ListenerProfile, BackendError> {
        self.listeners
            .read()
            .iter()
            .find(|l| l.is(listener_name, listener_type))
            .map(|l| l.profile.clone())
            .ok_or_else(|| BackendError::ListenerNotFound(listener_name.to_string()))
    }

    async fn generate_agent_artifact(
        &self,
        agent_type: &str,
        config: &str,
        profile: &ListenerProfile,
    ) -> Result<AgentArtifact, BackendError> {
        let supported = self
            .listeners
            .read()
            .iter()
            .find(|l| l.is(&profile.listener_name, &profile.listener_type))
            .map(|l| l.agent_types.is_empty() || l.agent_types.iter().any(|t| t == agent_type))
            .unwrap_or(false);

        if !supported {
            return Err(BackendError::UnsupportedAgentType(agent_type.to_string()));
        }

        // Stage manifest only; building real agent binaries is a builder plugin's job
        let manifest = serde_json::json!({
            "agent_type": agent_type,
            "label": profile.label,
            "config": config,
            "profile": String::from_utf8_lossy(&profile.profile),
        });
        let content = serde_json::to_vec(&manifest)
            .map_err(|e| BackendError::Other(format!("artifact encoding failed: {}", e)))?;

        Ok(AgentArtifact {
            file_name: format!("{}_{}.bin", agent_type, profile.label),
            content,
        })
    }

    async fn dispatch_command(&self, request: DispatchRequest) -> Result<(), BackendError> {
        {
            let agents = self.agents.read();
            let agent = agents
                .get(&request.agent_id)
                .ok_or_else(|| BackendError::AgentNotFound(request.agent_id.clone()))?;
            if !agent.connected {
                return Err(BackendError::AgentNotConnected(request.agent_id.clone()));
            }
        }

        if request.command_line.trim().is_empty() {
            return Err(BackendError::CommandRejected("empty command line".to_string()));
        }

        let task_id = TaskId::new(short_id());
        let agent_id = request.agent_id.clone();
        info!(
            agent_id = %agent_id,
            task_id = %task_id,
            hook_id = %request.hook_id,
            command_line = %request.command_line,
            "Task created"
        );

        let record = TaskRecord::from_dispatch(task_id.clone(), request);
        self.tasks.write().insert((agent_id, task_id), record);
        Ok(())
    }

    async fn merge_hook_fragment(
        &self,
        fragment: TaskHookFragment,
        job_index: JobIndex,
    ) -> Result<(), BackendError> {
        let key = (fragment.agent_id.clone(), fragment.task_id.clone());
        let correlation = fragment.correlation_key();

        let mut tasks = self.tasks.write();
        let task = tasks
            .get_mut(&key)
            .ok_or_else(|| BackendError::TaskNotFound(key.1.clone()))?;

        match task.merge(fragment, job_index, self.late_fragment_policy)? {
            MergeDisposition::Recorded => {}
            MergeDisposition::AppendedLate => {
                warn!(correlation = %correlation, job_index = %job_index, "Late fragment appended to completed job");
            }
            MergeDisposition::Discarded => {
                warn!(correlation = %correlation, job_index = %job_index, "Late fragment discarded");
            }
        }
        Ok(())
    }

    async fn remove_agent_from_console(&self, agent_id: &AgentId) -> Result<(), BackendError> {
        self.with_agent(agent_id, |agent| agent.visible = false)
    }

    async fn remove_agent(&self, agent_id: &AgentId) -> Result<(), BackendError> {
        self.agents
            .write()
            .remove(agent_id)
            .ok_or_else(|| BackendError::AgentNotFound(agent_id.clone()))?;
        self.tasks.write().retain(|(owner, _), _| owner != agent_id);
        info!(agent_id = %agent_id, "Agent removed");
        Ok(())
    }

    async fn set_agent_tag(&self, agent_id: &AgentId, tag: &str) -> Result<(), BackendError> {
        self.with_agent(agent_id, |agent| agent.tag = tag.to_string())
    }

    async fn set_agent_mark(&self, agent_id: &AgentId, mark: &str) -> Result<(), BackendError> {
        self.with_agent(agent_id, |agent| agent.mark = mark.to_string())
    }

    async fn set_agent_color(&self, agent_id: &AgentId, color: &AgentColor) -> Result<(), BackendError> {
        self.with_agent(agent_id, |agent| {
            agent.color = if color.reset {
                AgentColor::default()
            } else {
                color.clone()
            };
        })
    }

    async fn set_agent_impersonation(
        &self,
        agent_id: &AgentId,
        identity: &str,
        elevated: bool,
    ) -> Result<(), BackendError> {
        self.with_agent(agent_id, |agent| {
            agent.impersonated = if identity.is_empty() {
                None
            } else {
                Some(identity.to_string())
            };
            agent.elevated = elevated;
        })
    }

    async fn cancel_task(&self, agent_id: &AgentId, task_id: &TaskId) -> Result<(), BackendError> {
        let mut tasks = self.tasks.write();
        let task = tasks
            .get_mut(&(agent_id.clone(), task_id.clone()))
            .ok_or_else(|| BackendError::TaskNotFound(task_id.clone()))?;
        task.cancel()
    }

    async fn delete_task(&self, agent_id: &AgentId, task_id: &TaskId) -> Result<(), BackendError> {
        self.tasks
            .write()
            .remove(&(agent_id.clone(), task_id.clone()))
            .map(|_| ())
            .ok_or_else(|| BackendError::TaskNotFound(task_id.clone()))
    }

    async fn retrieve_object(&self, object_id: &ObjectId) -> Result<StoredObject, BackendError> {
        self.objects
            .read()
            .get(object_id)
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound(object_id.clone()))
    }

    async fn delete_object(&self, object_id: &ObjectId) -> Result<(), BackendError> {
        self.objects
            .write()
            .remove(object_id)
            .map(|_| ())
            .ok_or_else(|| BackendError::ObjectNotFound(object_id.clone()))
    }
}
