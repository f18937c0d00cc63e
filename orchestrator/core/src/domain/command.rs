// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Operator Commands
//!
//! [`CommandRequest`] is the transient form of one operator instruction. It
//! lives only for validation and dispatch; any persistence is the backend's
//! business. [`DeferredCommandReference`] points at a pre-staged request body
//! in the backend object store.
//!
//! The field names on the wire are the ones the operator console already
//! speaks (`name`, `id`, `ui`, `cmdline`, `data`, `ax_hook_id`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::agent::{AgentId, HookId, ObjectId};

/// Parsed command arguments, keyed by argument name.
pub type CommandArguments = Map<String, Value>;

/// A single operator-issued instruction bound for one agent.
///
/// The acting user is not part of the request; it is threaded separately into
/// every call from the authenticated context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Human label of the target agent session.
    #[serde(rename = "name", default)]
    pub agent_name: String,

    /// Routing key of the target agent session.
    #[serde(rename = "id", default)]
    pub agent_id: AgentId,

    /// Issued from an interactive console rather than a script.
    #[serde(rename = "ui", default)]
    pub ui_originated: bool,

    /// Literal command text, kept for audit and echo.
    #[serde(rename = "cmdline", default)]
    pub command_line: String,

    /// Serialized JSON object of command arguments.
    #[serde(rename = "data", default)]
    pub arguments_raw: String,

    #[serde(rename = "ax_hook_id", default)]
    pub hook_id: HookId,
}

impl CommandRequest {
    /// Parse `arguments_raw` into an argument map.
    ///
    /// Anything that is not a JSON object is a parse failure. Callers are
    /// expected to tolerate the error and dispatch with an empty map.
    pub fn parse_arguments(&self) -> Result<CommandArguments, serde_json::Error> {
        serde_json::from_str::<CommandArguments>(&self.arguments_raw)
    }
}

/// Indirection to a command body previously uploaded to object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredCommandReference {
    pub object_id: ObjectId,
}

impl DeferredCommandReference {
    pub fn new(object_id: impl Into<ObjectId>) -> Self {
        Self {
            object_id: object_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let json = r#"{
            "name": "beacon",
            "id": "a1",
            "ui": true,
            "cmdline": "ls /",
            "data": "{\"path\":\"/\"}",
            "ax_hook_id": "h1"
        }"#;
        let request: CommandRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.agent_name, "beacon");
        assert_eq!(request.agent_id.as_str(), "a1");
        assert!(request.ui_originated);
        assert_eq!(request.command_line, "ls /");
        assert_eq!(request.hook_id.as_str(), "h1");

        let args = request.parse_arguments().unwrap();
        assert_eq!(args.get("path"), Some(&Value::String("/".to_string())));
    }

    #[test]
    fn test_missing_fields_default() {
        let request: CommandRequest = serde_json::from_str(r#"{"id": "a1"}"#).unwrap();
        assert!(request.hook_id.is_empty());
        assert!(!request.ui_originated);
        assert!(request.arguments_raw.is_empty());
    }

    #[test]
    fn test_malformed_arguments_fail_to_parse() {
        let mut request = CommandRequest::default();

        request.arguments_raw = "{not json".to_string();
        assert!(request.parse_arguments().is_err());

        request.arguments_raw = "[1, 2, 3]".to_string();
        assert!(request.parse_arguments().is_err());

        request.arguments_raw = String::new();
        assert!(request.parse_arguments().is_err());
    }
}
