// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Agent and Task Identifiers
//!
//! Newtypes for every identifier that crosses the core boundary. All of them
//! are opaque strings chosen by the backend or the reporting agent; the core
//! never interprets their contents, it only routes on them.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`AgentId`] | Routing key of an agent session |
//! | [`TaskId`] | Backend task record created by a dispatch |
//! | [`HookId`] | Correlation token chosen by the operator console |
//! | [`ObjectId`] | Previously uploaded object (deferred payloads, downloads) |
//! | [`ActingUser`] | Operator identity taken from the authenticated context |

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Routing key of an agent session.
    AgentId
);

string_id!(
    /// Identifier of a backend task record.
    TaskId
);

string_id!(
    /// Opaque correlation token matching asynchronous results to a command.
    ///
    /// An empty hook id is valid: the command then produces a single
    /// backend-side response instead of a hooked one.
    HookId
);

string_id!(
    /// Reference to content previously uploaded to the backend object store.
    ObjectId
);

/// Operator identity bound to a request by the authentication layer.
///
/// Not `Deserialize`: an acting user is only ever built from the
/// authenticated request context, never bound from a client body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActingUser(String);

impl ActingUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActingUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display color pair applied to an agent row in operator consoles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentColor {
    pub background: String,
    pub foreground: String,
    /// Drop any custom color and fall back to the console defaults.
    pub reset: bool,
}

impl AgentColor {
    pub fn new(background: impl Into<String>, foreground: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            foreground: foreground.into(),
            reset: false,
        }
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = AgentId::new("a1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1\"");

        let parsed: TaskId = serde_json::from_str("\"t-42\"").unwrap();
        assert_eq!(parsed.as_str(), "t-42");
    }

    #[test]
    fn test_empty_hook_id_is_valid() {
        let hook = HookId::default();
        assert!(hook.is_empty());
        assert_eq!(hook.to_string(), "");
    }
}
