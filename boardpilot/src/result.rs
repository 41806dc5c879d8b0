use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AutomationError;

/// Uniform result envelope returned by every public operation.
///
/// Exactly one of the two shapes holds:
/// - `success == true`, `error` absent, `data` usually present
/// - `success == false`, `error` present, `data` absent
///
/// Callers never see an `Err`; failures are data, not exceptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AutomationResult {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }

    /// Fold an internal step result into the envelope. `what` names the
    /// operation for the failure message ("Create workspace", "Login", ...).
    pub(crate) fn from_step(
        what: &str,
        outcome: Result<(String, Option<Value>), AutomationError>,
    ) -> Self {
        match outcome {
            Ok((message, data)) => Self {
                success: true,
                message,
                data,
                error: None,
            },
            Err(e) => Self::failed(format!("{what} failed"), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_no_error() {
        let r = AutomationResult::ok("Workspace created", json!({"slug": "acme"}));
        assert!(r.success);
        assert!(r.error.is_none());
        assert!(!r.message.is_empty());
    }

    #[test]
    fn failure_envelope_always_carries_error() {
        let r = AutomationResult::from_step(
            "Create workspace",
            Err(AutomationError::ElementNotFound("submit button".into())),
        );
        assert!(!r.success);
        assert!(r.error.as_deref().unwrap().contains("submit button"));
        assert!(r.data.is_none());
        assert!(!r.message.is_empty());
    }

    #[test]
    fn envelope_serializes_without_null_fields() {
        let r = AutomationResult::ok_empty("Already logged out");
        let s = serde_json::to_string(&r).unwrap();
        assert!(!s.contains("error"));
        assert!(!s.contains("data"));
    }
}
