// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP ingress for operator consoles and hook reporters.
//!
//! Every endpoint is a `POST` with a JSON body and always answers HTTP 200
//! with `{"message": ..., "ok": ...}`, the shape operator consoles expect.
//! Binary payloads are framed as base64 here, never inside the core.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::application::{
    AgentAdminService, BatchOperationService, CommandDispatchService, DownloadService,
    GenerateAgentRequest, HookCorrelationService, HookReport, StandardCommandDispatchService,
    StandardHookCorrelationService,
};
use crate::domain::agent::{AgentColor, AgentId, HookId, ObjectId, TaskId};
use crate::domain::backend::Backend;
use crate::domain::command::{CommandRequest, DeferredCommandReference};
use crate::domain::hook::{JobIndex, MessageType};
use crate::domain::outcome::OperationOutcome;
use crate::presentation::auth::{authenticate, OperatorDirectory, RequestOperator};

const INVALID_JSON: &str = "invalid JSON data";
const MISSING_USER: &str = "Server error: username not found in context";

pub struct AppState {
    pub dispatch_service: Arc<dyn CommandDispatchService>,
    pub hook_service: Arc<dyn HookCorrelationService>,
    pub batch_service: BatchOperationService,
    pub agent_service: AgentAdminService,
    pub download_service: DownloadService,
}

impl AppState {
    /// Wire the standard services over one shared backend.
    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            dispatch_service: Arc::new(StandardCommandDispatchService::new(backend.clone())),
            hook_service: Arc::new(StandardHookCorrelationService::new(backend.clone())),
            batch_service: BatchOperationService::new(backend.clone()),
            agent_service: AgentAdminService::new(backend.clone()),
            download_service: DownloadService::new(backend),
        }
    }
}

pub fn app(state: AppState, operators: Arc<OperatorDirectory>) -> Router {
    let api = Router::new()
        .route("/agent/generate", post(generate_agent))
        .route("/agent/command/execute", post(execute_command))
        .route("/agent/command/file", post(execute_command_file))
        .route("/agent/console/remove", post(remove_agents_from_console))
        .route("/agent/remove", post(remove_agents))
        .route("/agent/set/tag", post(set_tag))
        .route("/agent/set/mark", post(set_mark))
        .route("/agent/set/color", post(set_color))
        .route("/agent/set/impersonate", post(set_impersonate))
        .route("/agent/task/cancel", post(cancel_tasks))
        .route("/agent/task/delete", post(delete_tasks))
        .route("/agent/task/hook", post(post_task_hook))
        .route("/download/sync", post(sync_download))
        .route("/download/delete", post(delete_download))
        .route_layer(axum::middleware::from_fn_with_state(operators, authenticate))
        .with_state(Arc::new(state));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn reply(outcome: OperationOutcome) -> Json<OperationOutcome> {
    Json(outcome)
}

fn invalid_json(rejection: JsonRejection) -> Json<OperationOutcome> {
    debug!(error = %rejection, "Request body rejected");
    reply(OperationOutcome::failure(INVALID_JSON))
}

/// `base64(name) + ":" + base64(content)`
pub fn frame_artifact(file_name: &str, content: &[u8]) -> String {
    format!("{}:{}", STANDARD.encode(file_name.as_bytes()), STANDARD.encode(content))
}

// ----- agents -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfigBody {
    pub listener_name: String,
    pub listener_type: String,
    #[serde(rename = "agent")]
    pub agent_type: String,
    pub config: String,
}

async fn generate_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentConfigBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    let Ok(Json(body)) = payload else {
        return reply(OperationOutcome::failure("invalid agent config"));
    };

    let request = GenerateAgentRequest {
        listener_name: body.listener_name,
        listener_type: body.listener_type,
        agent_type: body.agent_type,
        config: body.config,
    };

    match state.agent_service.generate_agent(request).await {
        Ok(artifact) => reply(OperationOutcome::success_with(frame_artifact(
            &artifact.file_name,
            &artifact.content,
        ))),
        Err(e) => reply(OperationOutcome::failure(e.to_string())),
    }
}

async fn execute_command(
    State(state): State<Arc<AppState>>,
    RequestOperator(user): RequestOperator,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Json<OperationOutcome> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_json(rejection),
    };
    let Some(user) = user else {
        return reply(OperationOutcome::failure(MISSING_USER));
    };

    reply(state.dispatch_service.dispatch(request, user).await.into())
}

async fn execute_command_file(
    State(state): State<Arc<AppState>>,
    RequestOperator(user): RequestOperator,
    payload: Result<Json<DeferredCommandReference>, JsonRejection>,
) -> Json<OperationOutcome> {
    let reference = match payload {
        Ok(Json(reference)) => reference,
        Err(rejection) => return invalid_json(rejection),
    };
    let Some(user) = user else {
        return reply(OperationOutcome::failure(MISSING_USER));
    };

    reply(state.dispatch_service.dispatch_deferred(reference, user).await.into())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentIdsBody {
    pub agent_id_array: Vec<AgentId>,
}

async fn remove_agents_from_console(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentIdsBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    match payload {
        Ok(Json(body)) => reply(state.batch_service.remove_agents_from_console(&body.agent_id_array).await),
        Err(rejection) => invalid_json(rejection),
    }
}

async fn remove_agents(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentIdsBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    match payload {
        Ok(Json(body)) => reply(state.batch_service.remove_agents(&body.agent_id_array).await),
        Err(rejection) => invalid_json(rejection),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentTagBody {
    pub agent_id_array: Vec<AgentId>,
    pub tag: String,
}

async fn set_tag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentTagBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    match payload {
        Ok(Json(body)) => reply(state.batch_service.set_agents_tag(&body.agent_id_array, &body.tag).await),
        Err(rejection) => invalid_json(rejection),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentMarkBody {
    pub agent_id_array: Vec<AgentId>,
    pub mark: String,
}

async fn set_mark(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentMarkBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    match payload {
        Ok(Json(body)) => reply(state.batch_service.set_agents_mark(&body.agent_id_array, &body.mark).await),
        Err(rejection) => invalid_json(rejection),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentColorBody {
    pub agent_id_array: Vec<AgentId>,
    #[serde(rename = "bc")]
    pub background: String,
    #[serde(rename = "fc")]
    pub foreground: String,
    pub reset: bool,
}

async fn set_color(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentColorBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_json(rejection),
    };
    let color = AgentColor {
        background: body.background,
        foreground: body.foreground,
        reset: body.reset,
    };
    reply(state.batch_service.set_agents_color(&body.agent_id_array, &color).await)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentImpersonateBody {
    pub agent_id: AgentId,
    pub impersonate: String,
    pub elevated: bool,
}

async fn set_impersonate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentImpersonateBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_json(rejection),
    };
    state
        .agent_service
        .set_impersonation(&body.agent_id, &body.impersonate, body.elevated)
        .await;
    reply(OperationOutcome::success())
}

// ----- tasks -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentTasksBody {
    pub agent_id: AgentId,
    pub tasks_array: Vec<TaskId>,
}

async fn cancel_tasks(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentTasksBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    match payload {
        Ok(Json(body)) => reply(state.batch_service.cancel_tasks(&body.agent_id, &body.tasks_array).await),
        Err(rejection) => invalid_json(rejection),
    }
}

async fn delete_tasks(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentTasksBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    match payload {
        Ok(Json(body)) => reply(state.batch_service.delete_tasks(&body.agent_id, &body.tasks_array).await),
        Err(rejection) => invalid_json(rejection),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskHookBody {
    #[serde(rename = "a_id")]
    pub agent_id: AgentId,
    #[serde(rename = "a_task_id")]
    pub task_id: TaskId,
    #[serde(rename = "a_hook_id")]
    pub hook_id: HookId,
    #[serde(rename = "a_job_index")]
    pub job_index: u32,
    #[serde(rename = "a_msg_type")]
    pub message_type: i32,
    #[serde(rename = "a_message")]
    pub message: String,
    #[serde(rename = "a_text")]
    pub text: String,
    #[serde(rename = "a_completed")]
    pub completed: bool,
}

async fn post_task_hook(
    State(state): State<Arc<AppState>>,
    RequestOperator(user): RequestOperator,
    payload: Result<Json<TaskHookBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_json(rejection),
    };
    let Some(user) = user else {
        return reply(OperationOutcome::failure(MISSING_USER));
    };

    let report = HookReport {
        agent_id: body.agent_id,
        task_id: body.task_id,
        hook_id: body.hook_id,
        message_type: MessageType::from(body.message_type),
        message: body.message,
        clear_text: body.text,
        completed: body.completed,
    };

    reply(
        state
            .hook_service
            .post_hook(report, JobIndex(body.job_index), user)
            .await
            .into(),
    )
}

// ----- downloads -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DownloadFileBody {
    pub file_id: ObjectId,
}

async fn sync_download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadFileBody>, JsonRejection>,
) -> Json<Value> {
    let Ok(Json(body)) = payload else {
        return Json(json!({ "message": "invalid action", "ok": false }));
    };

    match state.download_service.sync(&body.file_id).await {
        Ok(download) => Json(json!({
            "ok": true,
            "filename": download.file_name,
            "content": STANDARD.encode(&download.content),
        })),
        Err(e) => Json(json!({ "message": e.to_string(), "ok": false })),
    }
}

async fn delete_download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadFileBody>, JsonRejection>,
) -> Json<OperationOutcome> {
    let Ok(Json(body)) = payload else {
        return reply(OperationOutcome::failure("invalid action"));
    };

    match state.download_service.delete(&body.file_id).await {
        Ok(()) => reply(OperationOutcome::success_with("file delete")),
        Err(e) => reply(OperationOutcome::failure(e.to_string())),
    }
}
