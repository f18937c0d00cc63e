// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Batch Operation Executor
//!
//! Applies one backend operation to every id of an ordered target sequence
//! and folds the results into a single [`OperationOutcome`].
//!
//! - Calls run sequentially, once per id, in input order.
//! - A failing id never stops the sequence and nothing is rolled back.
//! - Success means every call succeeded; there is no partial-success status.
//! - The failure message numbers the failing entries from 1 in the order they
//!   failed, one line each: `"1. <error>\n2. <error>\n"`.
//!
//! Every id-set operation in [`BatchOperationService`] goes through
//! [`execute_batch`]; they differ only in which backend method they call.

use std::fmt::{Display, Write as _};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::agent::{AgentColor, AgentId, TaskId};
use crate::domain::backend::Backend;
use crate::domain::outcome::OperationOutcome;

/// The id-set operations exposed to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchOperation {
    RemoveFromConsole,
    RemoveAgent,
    SetTag,
    SetMark,
    SetColor,
    CancelTask,
    DeleteTask,
}

impl BatchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchOperation::RemoveFromConsole => "remove_from_console",
            BatchOperation::RemoveAgent => "remove_agent",
            BatchOperation::SetTag => "set_tag",
            BatchOperation::SetMark => "set_mark",
            BatchOperation::SetColor => "set_color",
            BatchOperation::CancelTask => "cancel_task",
            BatchOperation::DeleteTask => "delete_task",
        }
    }
}

impl Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run `op` once per target and aggregate the failures.
///
/// An empty target sequence succeeds without calling `op`.
pub async fn execute_batch<T, E, F, Fut>(
    operation: BatchOperation,
    targets: &[T],
    mut op: F,
) -> OperationOutcome
where
    T: Clone + Display,
    E: Display,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut errors: Vec<String> = Vec::new();

    for (position, target) in targets.iter().enumerate() {
        if let Err(e) = op(target.clone()).await {
            warn!(
                operation = %operation,
                position = position + 1,
                target = %target,
                error = %e,
                "Batch operation failed for target"
            );
            errors.push(e.to_string());
        }
    }

    let status = if errors.is_empty() { "ok" } else { "failed" };
    metrics::counter!(
        "switchboard_batch_operations_total",
        "operation" => operation.as_str(),
        "status" => status
    )
    .increment(1);

    if errors.is_empty() {
        debug!(operation = %operation, targets = targets.len(), "Batch operation succeeded");
        return OperationOutcome::success();
    }

    OperationOutcome::failure(render_failures(&errors))
}

fn render_failures(errors: &[String]) -> String {
    let mut message = String::new();
    for (i, error) in errors.iter().enumerate() {
        // Writing into a String cannot fail
        let _ = writeln!(message, "{}. {}", i + 1, error);
    }
    message
}

/// Id-set operations on agents and tasks.
#[derive(Clone)]
pub struct BatchOperationService {
    backend: Arc<dyn Backend>,
}

impl BatchOperationService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Soft removal: hide agents from consoles, keep their sessions.
    pub async fn remove_agents_from_console(&self, agent_ids: &[AgentId]) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::RemoveFromConsole, agent_ids, move |agent_id| async move {
            backend.remove_agent_from_console(&agent_id).await
        })
        .await
    }

    pub async fn remove_agents(&self, agent_ids: &[AgentId]) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::RemoveAgent, agent_ids, move |agent_id| async move {
            backend.remove_agent(&agent_id).await
        })
        .await
    }

    pub async fn set_agents_tag(&self, agent_ids: &[AgentId], tag: &str) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::SetTag, agent_ids, move |agent_id| async move {
            backend.set_agent_tag(&agent_id, tag).await
        })
        .await
    }

    pub async fn set_agents_mark(&self, agent_ids: &[AgentId], mark: &str) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::SetMark, agent_ids, move |agent_id| async move {
            backend.set_agent_mark(&agent_id, mark).await
        })
        .await
    }

    pub async fn set_agents_color(&self, agent_ids: &[AgentId], color: &AgentColor) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::SetColor, agent_ids, move |agent_id| async move {
            backend.set_agent_color(&agent_id, color).await
        })
        .await
    }

    pub async fn cancel_tasks(&self, agent_id: &AgentId, task_ids: &[TaskId]) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::CancelTask, task_ids, move |task_id| async move {
            backend.cancel_task(agent_id, &task_id).await
        })
        .await
    }

    pub async fn delete_tasks(&self, agent_id: &AgentId, task_ids: &[TaskId]) -> OperationOutcome {
        let backend = self.backend.as_ref();
        execute_batch(BatchOperation::DeleteTask, task_ids, move |task_id| async move {
            backend.delete_task(agent_id, &task_id).await
        })
        .await
    }
}
