// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer
//!
//! HTTP surface that translates operator requests into application service
//! calls. No business logic lives here.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Axum router, request bodies and handlers |
//! | [`auth`] | Bearer-token authentication and the acting-user extractor |

pub mod api;
pub mod auth;

pub use api::{app, AppState};
pub use auth::{OperatorDirectory, RequestOperator};
