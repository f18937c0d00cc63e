// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Integration tests for task hook correlation.

mod common;

use std::sync::Arc;

use common::RecordingBackend;
use switchboard_core::application::{
    CommandDispatchService, HookCorrelationService, HookReport, StandardCommandDispatchService,
    StandardHookCorrelationService,
};
use switchboard_core::domain::agent::{ActingUser, AgentId, HookId, TaskId};
use switchboard_core::domain::backend::BackendError;
use switchboard_core::domain::command::CommandRequest;
use switchboard_core::domain::hook::{JobIndex, MessageType};
use switchboard_core::domain::task::{LateFragmentPolicy, TaskStatus};
use switchboard_core::infrastructure::backend::{AgentSession, InMemoryBackend};

fn report(task: &str, hook: &str, text: &str, completed: bool) -> HookReport {
    HookReport {
        agent_id: AgentId::from("a1"),
        task_id: TaskId::from(task),
        hook_id: HookId::from(hook),
        message_type: MessageType::Output,
        message: String::new(),
        clear_text: text.to_string(),
        completed,
    }
}

#[tokio::test]
async fn test_fragment_forwarded_with_reporting_user() {
    let backend = Arc::new(RecordingBackend::new());
    let hooks = StandardHookCorrelationService::new(backend.clone());

    hooks
        .post_hook(report("t1", "h1", "root", false), JobIndex(0), ActingUser::new("alice"))
        .await
        .unwrap();

    let merged = backend.merged();
    assert_eq!(merged.len(), 1);
    let (fragment, job_index) = &merged[0];
    assert_eq!(*job_index, JobIndex(0));
    assert_eq!(fragment.reporting_user, ActingUser::new("alice"));
    assert_eq!(fragment.correlation_key().to_string(), "a1/t1/h1");
    assert_eq!(fragment.clear_text, "root");
}

#[tokio::test]
async fn test_fragment_after_completion_is_still_forwarded() {
    let backend = Arc::new(RecordingBackend::new());
    let hooks = StandardHookCorrelationService::new(backend.clone());
    let user = ActingUser::new("alice");

    hooks
        .post_hook(report("t1", "h1", "done", true), JobIndex(0), user.clone())
        .await
        .unwrap();
    hooks
        .post_hook(report("t1", "h1", "straggler", false), JobIndex(0), user)
        .await
        .unwrap();

    let merged = backend.merged();
    assert_eq!(merged.len(), 2);
    assert!(merged[0].0.completed);
    assert_eq!(merged[1].0.clear_text, "straggler");
}

#[tokio::test]
async fn test_backend_merge_error_is_returned() {
    let backend = Arc::new(RecordingBackend::new().fail_merge(BackendError::TaskNotFound(TaskId::from("t404"))));
    let hooks = StandardHookCorrelationService::new(backend.clone());

    let err = hooks
        .post_hook(report("t404", "h1", "", false), JobIndex(0), ActingUser::new("alice"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "task t404 not found");
    assert_eq!(backend.merged().len(), 1);
}

#[tokio::test]
async fn test_custom_message_type_survives() {
    let backend = Arc::new(RecordingBackend::new());
    let hooks = StandardHookCorrelationService::new(backend.clone());

    let mut custom = report("t1", "h1", "", false);
    custom.message_type = MessageType::from(42);
    hooks
        .post_hook(custom, JobIndex(3), ActingUser::new("alice"))
        .await
        .unwrap();

    assert_eq!(backend.merged()[0].0.message_type, MessageType::Custom(42));
}

/// Dispatch through the core, then stream fragments for two jobs of the same
/// task into the in-memory backend.
#[tokio::test]
async fn test_job_indices_are_independent_end_to_end() {
    let backend = Arc::new(InMemoryBackend::new(LateFragmentPolicy::Log));
    backend.register_agent(AgentSession::new("a1", "beacon", "beacon"));

    let dispatch = StandardCommandDispatchService::new(backend.clone());
    dispatch
        .dispatch(
            CommandRequest {
                agent_id: AgentId::from("a1"),
                command_line: "ps".to_string(),
                arguments_raw: "{}".to_string(),
                hook_id: HookId::from("h1"),
                ..CommandRequest::default()
            },
            ActingUser::new("alice"),
        )
        .await
        .unwrap();

    let task_id = backend.tasks_for(&AgentId::from("a1"))[0].task_id.clone();
    let hooks = StandardHookCorrelationService::new(backend.clone());
    let user = ActingUser::new("alice");

    hooks
        .post_hook(report(task_id.as_str(), "h1", "job0 done", true), JobIndex(0), user.clone())
        .await
        .unwrap();
    hooks
        .post_hook(report(task_id.as_str(), "h1", "job1 part", false), JobIndex(1), user.clone())
        .await
        .unwrap();

    let task = backend.task(&AgentId::from("a1"), &task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Running);

    hooks
        .post_hook(report(task_id.as_str(), "h1", "job1 done", true), JobIndex(1), user)
        .await
        .unwrap();

    let task = backend.task(&AgentId::from("a1"), &task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Finished);
    assert_eq!(task.job_output(JobIndex(1)), Some("job1 partjob1 done".to_string()));
}

#[tokio::test]
async fn test_reject_policy_reports_late_fragment() {
    let backend = Arc::new(InMemoryBackend::new(LateFragmentPolicy::Reject));
    backend.register_agent(AgentSession::new("a1", "beacon", "beacon"));
    StandardCommandDispatchService::new(backend.clone())
        .dispatch(
            CommandRequest {
                agent_id: AgentId::from("a1"),
                command_line: "id".to_string(),
                hook_id: HookId::from("h1"),
                ..CommandRequest::default()
            },
            ActingUser::new("alice"),
        )
        .await
        .unwrap();
    let task_id = backend.tasks_for(&AgentId::from("a1"))[0].task_id.clone();
    let hooks = StandardHookCorrelationService::new(backend.clone());

    hooks
        .post_hook(report(task_id.as_str(), "h1", "uid=0", true), JobIndex(0), ActingUser::new("alice"))
        .await
        .unwrap();
    let err = hooks
        .post_hook(report(task_id.as_str(), "h1", "late", false), JobIndex(0), ActingUser::new("alice"))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::JobAlreadyCompleted { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_for_one_task() {
    const JOBS: u32 = 8;
    const PER_JOB: u32 = 50;

    let backend = Arc::new(InMemoryBackend::new(LateFragmentPolicy::Append));
    backend.register_agent(AgentSession::new("a1", "beacon", "beacon"));
    StandardCommandDispatchService::new(backend.clone())
        .dispatch(
            CommandRequest {
                agent_id: AgentId::from("a1"),
                command_line: "find /".to_string(),
                hook_id: HookId::from("h1"),
                ..CommandRequest::default()
            },
            ActingUser::new("alice"),
        )
        .await
        .unwrap();
    let task_id = backend.tasks_for(&AgentId::from("a1"))[0].task_id.clone();
    let hooks = Arc::new(StandardHookCorrelationService::new(backend.clone()));

    let mut handles = Vec::new();
    for job in 0..JOBS {
        for part in 0..PER_JOB {
            let hooks = hooks.clone();
            let task_id = task_id.clone();
            handles.push(tokio::spawn(async move {
                let completed = part == PER_JOB - 1;
                hooks
                    .post_hook(
                        report(task_id.as_str(), "h1", "x", completed),
                        JobIndex(job),
                        ActingUser::new("agent"),
                    )
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let task = backend.task(&AgentId::from("a1"), &task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Finished);
    assert_eq!(task.jobs.len(), JOBS as usize);
    assert!(task.jobs.values().all(|job| job.completed));
    let fragments: usize = task.jobs.values().map(|job| job.fragments.len()).sum();
    assert_eq!(fragments, (JOBS * PER_JOB) as usize);
}
