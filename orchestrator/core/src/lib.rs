// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Switchboard core.
//!
//! Command dispatch and hook correlation for a multi-agent control server.
//!
//! # Architecture
//!
//! - **domain**: identifiers, requests, fragments and the [`Backend`](domain::backend::Backend) port
//! - **application**: dispatch, hook correlation, batch operations, agent admin, downloads
//! - **infrastructure**: the in-memory backend
//! - **presentation**: HTTP router and operator authentication

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
