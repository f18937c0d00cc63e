// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Task Records (backend-owned)
//!
//! The durable side of the hook protocol. The core itself never reads these
//! records; they exist for backend adapters that need a reference
//! implementation of the task state machine:
//!
//! ```text
//! Dispatched ──fragment──▶ Running ──all jobs completed──▶ Finished
//!      │                      │
//!      └────────cancel────────┴──▶ Cancelled
//! ```
//!
//! A job becomes completed on its first fragment with `completed = true`.
//! Fragments for a job that is already completed are "late" and handled by a
//! [`LateFragmentPolicy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::domain::agent::{ActingUser, AgentId, HookId, TaskId};
use crate::domain::backend::{BackendError, DispatchRequest};
use crate::domain::command::CommandArguments;
use crate::domain::hook::{JobIndex, MessageType, TaskHookFragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Dispatched,
    Running,
    Finished,
    Cancelled,
}

/// What to do with a fragment that arrives after its job completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateFragmentPolicy {
    /// Accept the post, log a warning and discard the fragment.
    #[default]
    Log,
    /// Record the fragment on the completed job.
    Append,
    /// Fail the post so the reporting source sees an error.
    Reject,
}

impl FromStr for LateFragmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "append" => Ok(Self::Append),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown late fragment policy '{}', expected log, append or reject",
                other
            )),
        }
    }
}

/// Result of merging one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDisposition {
    Recorded,
    /// Recorded after the job had already completed.
    AppendedLate,
    /// Accepted but dropped.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRecord {
    pub message_type: MessageType,
    pub message: String,
    pub clear_text: String,
    pub reporting_user: ActingUser,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRecord {
    pub fragments: Vec<FragmentRecord>,
    pub completed: bool,
}

/// Durable record of one dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub agent_id: AgentId,
    pub hook_id: HookId,
    pub command_line: String,
    pub arguments: CommandArguments,
    pub client: ActingUser,
    pub ui_originated: bool,
    pub status: TaskStatus,
    pub jobs: BTreeMap<JobIndex, JobRecord>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn from_dispatch(task_id: TaskId, request: DispatchRequest) -> Self {
        Self {
            task_id,
            agent_id: request.agent_id,
            hook_id: request.hook_id,
            command_line: request.command_line,
            arguments: request.arguments,
            client: request.acting_user,
            ui_originated: request.ui_originated,
            status: TaskStatus::Dispatched,
            jobs: BTreeMap::new(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Finished | TaskStatus::Cancelled)
    }

    /// Merge a fragment into the job it belongs to and advance the task state.
    pub fn merge(
        &mut self,
        fragment: TaskHookFragment,
        job_index: JobIndex,
        policy: LateFragmentPolicy,
    ) -> Result<MergeDisposition, BackendError> {
        if fragment.hook_id != self.hook_id {
            return Err(BackendError::HookMismatch {
                task_id: self.task_id.clone(),
                hook_id: fragment.hook_id,
            });
        }

        let job_completed = self
            .jobs
            .get(&job_index)
            .map(|job| job.completed)
            .unwrap_or(false);

        if job_completed || self.status == TaskStatus::Cancelled {
            return match policy {
                LateFragmentPolicy::Log => Ok(MergeDisposition::Discarded),
                LateFragmentPolicy::Append => {
                    self.jobs
                        .entry(job_index)
                        .or_default()
                        .fragments
                        .push(record_of(&fragment));
                    Ok(MergeDisposition::AppendedLate)
                }
                LateFragmentPolicy::Reject if self.status == TaskStatus::Cancelled => {
                    Err(BackendError::TaskCancelled(self.task_id.clone()))
                }
                LateFragmentPolicy::Reject => Err(BackendError::JobAlreadyCompleted {
                    task_id: self.task_id.clone(),
                    job_index,
                }),
            };
        }

        let job = self.jobs.entry(job_index).or_default();
        job.fragments.push(record_of(&fragment));
        if fragment.completed {
            job.completed = true;
        }

        if self.jobs.values().all(|job| job.completed) {
            self.status = TaskStatus::Finished;
            self.finished_at = Some(Utc::now());
        } else {
            self.status = TaskStatus::Running;
        }

        Ok(MergeDisposition::Recorded)
    }

    pub fn cancel(&mut self) -> Result<(), BackendError> {
        if self.is_terminal() {
            return Err(BackendError::Other(format!(
                "task {} is already {}",
                self.task_id,
                match self.status {
                    TaskStatus::Cancelled => "cancelled",
                    _ => "finished",
                }
            )));
        }
        self.status = TaskStatus::Cancelled;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Concatenated clear text of one job, in arrival order.
    pub fn job_output(&self, job_index: JobIndex) -> Option<String> {
        self.jobs.get(&job_index).map(|job| {
            job.fragments
                .iter()
                .map(|f| f.clear_text.as_str())
                .collect::<String>()
        })
    }
}

fn record_of(fragment: &TaskHookFragment) -> FragmentRecord {
    FragmentRecord {
        message_type: fragment.message_type,
        message: fragment.message.clone(),
        clear_text: fragment.clear_text.clone(),
        reporting_user: fragment.reporting_user.clone(),
        received_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskRecord {
        TaskRecord::from_dispatch(
            TaskId::new("t1"),
            DispatchRequest {
                agent_name: "beacon".to_string(),
                agent_id: AgentId::new("a1"),
                acting_user: ActingUser::new("alice"),
                hook_id: HookId::new("h1"),
                command_line: "ps".to_string(),
                ui_originated: true,
                arguments: CommandArguments::new(),
            },
        )
    }

    fn fragment(text: &str, completed: bool) -> TaskHookFragment {
        TaskHookFragment {
            agent_id: AgentId::new("a1"),
            task_id: TaskId::new("t1"),
            hook_id: HookId::new("h1"),
            message_type: MessageType::Output,
            message: text.to_string(),
            clear_text: text.to_string(),
            completed,
            reporting_user: ActingUser::new("agent-bot"),
        }
    }

    #[test]
    fn test_state_machine_runs_to_finished() {
        let mut task = task();
        assert_eq!(task.status, TaskStatus::Dispatched);

        task.merge(fragment("a", false), JobIndex(0), LateFragmentPolicy::Log).unwrap();
        assert_eq!(task.status, TaskStatus::Running);

        task.merge(fragment("b", true), JobIndex(0), LateFragmentPolicy::Log).unwrap();
        assert_eq!(task.status, TaskStatus::Finished);
        assert!(task.finished_at.is_some());
        assert_eq!(task.job_output(JobIndex(0)).as_deref(), Some("ab"));
    }

    #[test]
    fn test_out_of_order_jobs() {
        let mut task = task();

        // job 2 finishes before job 0 has reported anything
        task.merge(fragment("late job", true), JobIndex(2), LateFragmentPolicy::Log).unwrap();
        assert_eq!(task.status, TaskStatus::Finished);

        task.merge(fragment("first", false), JobIndex(0), LateFragmentPolicy::Log).unwrap();
        assert_eq!(task.status, TaskStatus::Running);

        task.merge(fragment("", true), JobIndex(0), LateFragmentPolicy::Log).unwrap();
        assert_eq!(task.status, TaskStatus::Finished);
        assert_eq!(task.jobs.len(), 2);
    }

    #[test]
    fn test_late_fragment_policies() {
        let mut task = task();
        task.merge(fragment("done", true), JobIndex(0), LateFragmentPolicy::Log).unwrap();

        let log = task.merge(fragment("x", false), JobIndex(0), LateFragmentPolicy::Log).unwrap();
        assert_eq!(log, MergeDisposition::Discarded);
        assert_eq!(task.jobs[&JobIndex(0)].fragments.len(), 1);

        let append = task.merge(fragment("y", false), JobIndex(0), LateFragmentPolicy::Append).unwrap();
        assert_eq!(append, MergeDisposition::AppendedLate);
        assert_eq!(task.jobs[&JobIndex(0)].fragments.len(), 2);

        let reject = task.merge(fragment("z", false), JobIndex(0), LateFragmentPolicy::Reject);
        assert!(matches!(reject, Err(BackendError::JobAlreadyCompleted { .. })));
        assert_eq!(task.status, TaskStatus::Finished);
    }

    #[test]
    fn test_hook_mismatch() {
        let mut task = task();
        let mut foreign = fragment("x", false);
        foreign.hook_id = HookId::new("other");

        let err = task.merge(foreign, JobIndex(0), LateFragmentPolicy::Log).unwrap_err();
        assert_eq!(err.to_string(), "hook other does not belong to task t1");
        assert_eq!(task.status, TaskStatus::Dispatched);
    }

    #[test]
    fn test_cancel() {
        let mut task = task();
        task.cancel().unwrap();
        assert_eq!(task.status, TaskStatus::Cancelled);
        assert!(task.cancel().is_err());
    }

    #[test]
    fn test_reject_after_cancel_names_the_cancellation() {
        let mut task = task();
        task.cancel().unwrap();

        let err = task
            .merge(fragment("x", false), JobIndex(0), LateFragmentPolicy::Reject)
            .unwrap_err();
        assert_eq!(err, BackendError::TaskCancelled(TaskId::new("t1")));
        assert_eq!(err.to_string(), "task t1 was cancelled");
        assert!(task.jobs.is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("APPEND".parse::<LateFragmentPolicy>(), Ok(LateFragmentPolicy::Append));
        assert!("drop".parse::<LateFragmentPolicy>().is_err());
    }
}
