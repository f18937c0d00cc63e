// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Task Hook Fragments
//!
//! A [`TaskHookFragment`] is one incremental or terminal result reported for a
//! task that was already dispatched. Fragments are identified by their
//! [`CorrelationKey`] `(agent_id, task_id, hook_id)`; the [`JobIndex`] rides
//! next to the fragment and separates the concurrent sub-jobs one task can
//! fan out into.
//!
//! ```text
//!  dispatch ──▶ task T (hook H)
//!                 ├─ job 0: fragment, fragment, fragment(completed)
//!                 └─ job 1: fragment(completed)
//! ```
//!
//! Ordering between fragments is never guaranteed; a completed fragment for
//! job 1 may arrive before job 0's first one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::agent::{ActingUser, AgentId, HookId, TaskId};

/// Payload kind of a fragment, as rendered by operator consoles.
///
/// Unknown tags are preserved in [`MessageType::Custom`] so fragments are
/// forwarded without alteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum MessageType {
    LocalOutput,
    LocalInfo,
    LocalError,
    LocalSuccess,
    Info,
    Error,
    Success,
    Output,
    Custom(i32),
}

impl From<i32> for MessageType {
    fn from(value: i32) -> Self {
        match value {
            1 => MessageType::LocalOutput,
            2 => MessageType::LocalInfo,
            3 => MessageType::LocalError,
            4 => MessageType::LocalSuccess,
            5 => MessageType::Info,
            6 => MessageType::Error,
            7 => MessageType::Success,
            10 => MessageType::Output,
            other => MessageType::Custom(other),
        }
    }
}

impl From<MessageType> for i32 {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::LocalOutput => 1,
            MessageType::LocalInfo => 2,
            MessageType::LocalError => 3,
            MessageType::LocalSuccess => 4,
            MessageType::Info => 5,
            MessageType::Error => 6,
            MessageType::Success => 7,
            MessageType::Output => 10,
            MessageType::Custom(other) => other,
        }
    }
}

/// Ordinal of a sub-job spawned by one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobIndex(pub u32);

impl fmt::Display for JobIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a fragment. Job index and message type are metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorrelationKey {
    pub agent_id: AgentId,
    pub task_id: TaskId,
    pub hook_id: HookId,
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.agent_id, self.task_id, self.hook_id)
    }
}

/// One reported result fragment for an already-dispatched task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHookFragment {
    pub agent_id: AgentId,
    pub task_id: TaskId,
    pub hook_id: HookId,
    pub message_type: MessageType,
    /// Native payload, possibly binary-safe encoded.
    pub message: String,
    /// Human-readable rendering of the same fragment.
    pub clear_text: String,
    /// Terminal fragment for its `(task_id, job_index)` pair.
    pub completed: bool,
    pub reporting_user: ActingUser,
}

impl TaskHookFragment {
    pub fn correlation_key(&self) -> CorrelationKey {
        CorrelationKey {
            agent_id: self.agent_id.clone(),
            task_id: self.task_id.clone(),
            hook_id: self.hook_id.clone(),
        }
    }
}
