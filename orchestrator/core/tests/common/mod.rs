// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Shared test doubles for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use switchboard_core::domain::agent::{AgentColor, AgentId, ObjectId, TaskId};
use switchboard_core::domain::backend::{
    AgentArtifact, Backend, BackendError, DispatchRequest, ListenerProfile, StoredObject,
};
use switchboard_core::domain::hook::{JobIndex, TaskHookFragment};

/// Every backend call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ResolveListener(String, String),
    GenerateArtifact(String, String),
    Dispatch(DispatchRequest),
    Merge(TaskHookFragment, JobIndex),
    RemoveFromConsole(AgentId),
    RemoveAgent(AgentId),
    SetTag(AgentId, String),
    SetMark(AgentId, String),
    SetColor(AgentId, AgentColor),
    SetImpersonation(AgentId, String, bool),
    CancelTask(AgentId, TaskId),
    DeleteTask(AgentId, TaskId),
    RetrieveObject(ObjectId),
    DeleteObject(ObjectId),
}

/// Backend that records every call and fails on demand.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    failing_agents: HashMap<AgentId, BackendError>,
    failing_tasks: HashMap<TaskId, BackendError>,
    objects: HashMap<ObjectId, StoredObject>,
    merge_error: Option<BackendError>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every per-agent call for `agent_id` fails with `error`.
    pub fn fail_agent(mut self, agent_id: &str, error: BackendError) -> Self {
        self.failing_agents.insert(AgentId::from(agent_id), error);
        self
    }

    pub fn fail_task(mut self, task_id: &str, error: BackendError) -> Self {
        self.failing_tasks.insert(TaskId::from(task_id), error);
        self
    }

    pub fn fail_merge(mut self, error: BackendError) -> Self {
        self.merge_error = Some(error);
        self
    }

    pub fn with_object(mut self, object_id: &str, name: &str, content: &[u8]) -> Self {
        self.objects.insert(
            ObjectId::from(object_id),
            StoredObject {
                name: name.to_string(),
                content: content.to_vec(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn dispatched(&self) -> Vec<DispatchRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Dispatch(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn merged(&self) -> Vec<(TaskHookFragment, JobIndex)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Merge(fragment, job_index) => Some((fragment, job_index)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn agent_result(&self, agent_id: &AgentId) -> Result<(), BackendError> {
        match self.failing_agents.get(agent_id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn task_result(&self, task_id: &TaskId) -> Result<(), BackendError> {
        match self.failing_tasks.get(task_id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn resolve_listener_profile(
        &self,
        listener_name: &str,
        listener_type: &str,
    ) -> Result<ListenerProfile, BackendError> {
        self.record(Call::ResolveListener(listener_name.to_string(), listener_type.to_string()));
        Ok(ListenerProfile {
            listener_name: listener_name.to_string(),
            listener_type: listener_type.to_string(),
            label: "test".to_string(),
            profile: b"{}".to_vec(),
        })
    }

    async fn generate_agent_artifact(
        &self,
        agent_type: &str,
        config: &str,
        profile: &ListenerProfile,
    ) -> Result<AgentArtifact, BackendError> {
        self.record(Call::GenerateArtifact(agent_type.to_string(), config.to_string()));
        Ok(AgentArtifact {
            file_name: format!("{}_{}.bin", agent_type, profile.label),
            content: b"MZ".to_vec(),
        })
    }

    async fn dispatch_command(&self, request: DispatchRequest) -> Result<(), BackendError> {
        let agent_id = request.agent_id.clone();
        self.record(Call::Dispatch(request));
        self.agent_result(&agent_id)
    }

    async fn merge_hook_fragment(
        &self,
        fragment: TaskHookFragment,
        job_index: JobIndex,
    ) -> Result<(), BackendError> {
        self.record(Call::Merge(fragment, job_index));
        match &self.merge_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn remove_agent_from_console(&self, agent_id: &AgentId) -> Result<(), BackendError> {
        self.record(Call::RemoveFromConsole(agent_id.clone()));
        self.agent_result(agent_id)
    }

    async fn remove_agent(&self, agent_id: &AgentId) -> Result<(), BackendError> {
        self.record(Call::RemoveAgent(agent_id.clone()));
        self.agent_result(agent_id)
    }

    async fn set_agent_tag(&self, agent_id: &AgentId, tag: &str) -> Result<(), BackendError> {
        self.record(Call::SetTag(agent_id.clone(), tag.to_string()));
        self.agent_result(agent_id)
    }

    async fn set_agent_mark(&self, agent_id: &AgentId, mark: &str) -> Result<(), BackendError> {
        self.record(Call::SetMark(agent_id.clone(), mark.to_string()));
        self.agent_result(agent_id)
    }

    async fn set_agent_color(&self, agent_id: &AgentId, color: &AgentColor) -> Result<(), BackendError> {
        self.record(Call::SetColor(agent_id.clone(), color.clone()));
        self.agent_result(agent_id)
    }

    async fn set_agent_impersonation(
        &self,
        agent_id: &AgentId,
        identity: &str,
        elevated: bool,
    ) -> Result<(), BackendError> {
        self.record(Call::SetImpersonation(agent_id.clone(), identity.to_string(), elevated));
        self.agent_result(agent_id)
    }

    async fn cancel_task(&self, agent_id: &AgentId, task_id: &TaskId) -> Result<(), BackendError> {
        self.record(Call::CancelTask(agent_id.clone(), task_id.clone()));
        self.task_result(task_id)
    }

    async fn delete_task(&self, agent_id: &AgentId, task_id: &TaskId) -> Result<(), BackendError> {
        self.record(Call::DeleteTask(agent_id.clone(), task_id.clone()));
        self.task_result(task_id)
    }

    async fn retrieve_object(&self, object_id: &ObjectId) -> Result<StoredObject, BackendError> {
        self.record(Call::RetrieveObject(object_id.clone()));
        self.objects
            .get(object_id)
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound(object_id.clone()))
    }

    async fn delete_object(&self, object_id: &ObjectId) -> Result<(), BackendError> {
        self.record(Call::DeleteObject(object_id.clone()));
        if self.objects.contains_key(object_id) {
            Ok(())
        } else {
            Err(BackendError::ObjectNotFound(object_id.clone()))
        }
    }
}
