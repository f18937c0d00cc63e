// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Application Layer
//!
//! Use cases over the [`Backend`](crate::domain::backend::Backend) capability
//! interface. Services hold nothing but an `Arc<dyn Backend>`; all
//! cross-request state belongs to the backend.

pub mod agent;
pub mod batch;
pub mod dispatch;
pub mod download;
pub mod hook;

pub use agent::{AgentAdminService, GenerateAgentRequest};
pub use batch::{execute_batch, BatchOperation, BatchOperationService};
pub use dispatch::{CommandDispatchService, DispatchError, StandardCommandDispatchService};
pub use download::{DownloadService, SyncedDownload};
pub use hook::{HookCorrelationService, HookReport, StandardHookCorrelationService};
