// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

/// User-visible result of every core operation: a success flag plus a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub message: String,
    pub ok: bool,
}

impl OperationOutcome {
    /// Success with an empty message.
    pub fn success() -> Self {
        Self::success_with(String::new())
    }

    pub fn success_with(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ok: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ok: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.ok
    }
}

impl<E: std::fmt::Display> From<Result<(), E>> for OperationOutcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(OperationOutcome::failure("agent offline")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "agent offline", "ok": false}));
    }

    #[test]
    fn test_from_result() {
        let ok: OperationOutcome = Ok::<(), String>(()).into();
        assert_eq!(ok, OperationOutcome::success());

        let err: OperationOutcome = Err::<(), _>("boom").into();
        assert!(!err.is_success());
        assert_eq!(err.message, "boom");
    }
}
