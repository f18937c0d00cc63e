// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types and the backend capability contract. No I/O lives here.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`agent`] | `AgentId`, `TaskId`, `HookId`, `ObjectId`, `ActingUser`, `AgentColor` |
//! | [`command`] | `CommandRequest`, `DeferredCommandReference` |
//! | [`hook`] | `TaskHookFragment`, `JobIndex`, `MessageType`, `CorrelationKey` |
//! | [`backend`] | `Backend` trait, `BackendError` |
//! | [`task`] | `TaskRecord` state machine for backend adapters |
//! | [`outcome`] | `OperationOutcome` |
//! | [`server_config`] | `ServerConfigManifest` |

pub mod agent;
pub mod backend;
pub mod command;
pub mod hook;
pub mod outcome;
pub mod server_config;
pub mod task;
