// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Backend Adapters
//!
//! Infrastructure implementations of the [`Backend`](crate::domain::backend::Backend)
//! capability interface.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Own agent sessions, task records and stored objects
//! - **Pattern:** Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **InMemoryBackend** - lock-guarded maps, ephemeral; development and tests

pub mod in_memory;

pub use in_memory::{AgentSession, InMemoryBackend};
