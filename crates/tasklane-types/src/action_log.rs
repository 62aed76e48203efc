//! Audit trail record for business operations.
//!
//! One `ActionLogRecord` is written per wrapped business operation, after
//! the operation finishes, whether it committed or rolled back. Records are
//! append-only: never updated, never deleted by the core (retention is an
//! external concern).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::BTreeMap;

/// A persisted log entry describing one business operation's context and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogRecord {
    /// Store-generated row id. 0 until the record is persisted.
    pub id: i64,
    /// Acting user, if the caller's identity was resolvable.
    pub actor_id: Option<Uuid>,
    /// Network origin (remote address) of the request.
    pub origin: String,
    /// Client agent string.
    pub user_agent: String,
    /// HTTP method of the wrapped request.
    pub method: String,
    /// Endpoint path of the wrapped request.
    pub path: String,
    /// Flattened route/query parameters, serialized as JSON.
    pub params: String,
    /// Caller-supplied human-readable description of the action.
    pub description: String,
    /// Response status code, if one was produced.
    pub status: Option<u16>,
    /// Error text when the wrapped operation failed.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request context captured before a wrapped operation runs.
///
/// Passed explicitly through the audit hooks -- never carried in ambient
/// or task-local state.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    pub actor_id: Option<Uuid>,
    pub origin: String,
    pub user_agent: String,
    pub method: String,
    pub path: String,
    /// Flattened route and query parameters.
    pub params: BTreeMap<String, String>,
    /// Human-readable description of the action, e.g. "create task".
    pub description: String,
}

/// Outcome of a wrapped operation, captured after it finishes.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl ActionOutcome {
    /// Outcome for a successful operation with the given status code.
    pub fn success(status: u16) -> Self {
        Self {
            status: Some(status),
            error: None,
        }
    }

    /// Outcome for a failed operation.
    pub fn failure(status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
        }
    }
}

impl ActionLogRecord {
    /// Build a record from a request context and its outcome.
    ///
    /// Parameter maps are serialized to JSON; a map that fails to serialize
    /// cannot occur for `BTreeMap<String, String>`, so `params` is always
    /// valid JSON text.
    pub fn from_context(ctx: &ActionContext, outcome: &ActionOutcome, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            actor_id: ctx.actor_id,
            origin: ctx.origin.clone(),
            user_agent: ctx.user_agent.clone(),
            method: ctx.method.clone(),
            path: ctx.path.clone(),
            params: serde_json::to_string(&ctx.params).unwrap_or_else(|_| "{}".to_string()),
            description: ctx.description.clone(),
            status: outcome.status,
            error: outcome.error.clone(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_context_serializes_params() {
        let mut ctx = ActionContext {
            method: "POST".to_string(),
            path: "/api/tasks".to_string(),
            description: "create task".to_string(),
            ..Default::default()
        };
        ctx.params.insert("area_id".to_string(), "42".to_string());

        let record =
            ActionLogRecord::from_context(&ctx, &ActionOutcome::success(201), Utc::now());

        assert_eq!(record.method, "POST");
        assert_eq!(record.status, Some(201));
        assert!(record.error.is_none());

        let parsed: BTreeMap<String, String> = serde_json::from_str(&record.params).unwrap();
        assert_eq!(parsed.get("area_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_record_from_failed_outcome_keeps_error() {
        let ctx = ActionContext {
            method: "DELETE".to_string(),
            path: "/api/areas/7".to_string(),
            ..Default::default()
        };
        let outcome = ActionOutcome::failure(Some(409), "area has tasks");
        let record = ActionLogRecord::from_context(&ctx, &outcome, Utc::now());

        assert_eq!(record.status, Some(409));
        assert_eq!(record.error.as_deref(), Some("area has tasks"));
    }
}
