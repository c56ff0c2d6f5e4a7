//! Admin Audit Trail
//!
//! Structured records of every request that reaches a privileged path.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::domain::identity::RequestIdentity;
use crate::domain::value_object::user_role::UserRole;

/// What happened to a privileged request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    /// Admin identity, handler about to run
    Granted,
    /// Denied before the handler
    Forbidden,
    /// Handler finished without a server error
    Completed,
    /// Handler finished with a server error
    Failed,
}

impl AuditOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Granted => "GRANTED",
            AuditOutcome::Forbidden => "FORBIDDEN",
            AuditOutcome::Completed => "COMPLETED",
            AuditOutcome::Failed => "FAILED",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub user_id: Option<UserId>,
    pub role: Option<UserRole>,
    pub path: String,
    pub method: String,
    pub outcome: AuditOutcome,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(
        identity: Option<&RequestIdentity>,
        path: impl Into<String>,
        method: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id: identity.map(|i| i.user_id),
            role: identity.map(|i| i.role),
            path: path.into(),
            method: method.into(),
            outcome,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Destination for audit records
pub trait AuditSink: Send + Sync + 'static {
    fn record(&self, event: &AuditEvent);
}

/// Writes audit records as `tracing` events under the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let user_id = event.user_id.map(|id| id.to_string());
        let role = event.role.map(|r| r.code());
        let timestamp = event.timestamp.to_rfc3339();

        match event.outcome {
            AuditOutcome::Granted | AuditOutcome::Completed => {
                tracing::info!(
                    target: "audit",
                    outcome = %event.outcome,
                    user_id = ?user_id,
                    role = ?role,
                    method = %event.method,
                    path = %event.path,
                    timestamp = %timestamp,
                    "Admin API access"
                );
            }
            AuditOutcome::Forbidden => {
                tracing::warn!(
                    target: "audit",
                    outcome = %event.outcome,
                    user_id = ?user_id,
                    role = ?role,
                    method = %event.method,
                    path = %event.path,
                    timestamp = %timestamp,
                    "Unauthorized admin API access attempt"
                );
            }
            AuditOutcome::Failed => {
                tracing::error!(
                    target: "audit",
                    outcome = %event.outcome,
                    user_id = ?user_id,
                    role = ?role,
                    method = %event.method,
                    path = %event.path,
                    timestamp = %timestamp,
                    error = event.error.as_deref().unwrap_or("unknown"),
                    "Admin API request failed"
                );
            }
        }
    }
}

/// Keeps records in memory, for tests and diagnostics
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn outcomes(&self) -> Vec<AuditOutcome> {
        self.events().into_iter().map(|e| e.outcome).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_identity() {
        let identity = RequestIdentity::new(UserId::new(), UserRole::Admin);
        let event = AuditEvent::new(Some(&identity), "/admin/x", "GET", AuditOutcome::Granted);

        assert_eq!(event.user_id, Some(identity.user_id));
        assert_eq!(event.role, Some(UserRole::Admin));
        assert!(event.error.is_none());
    }

    #[test]
    fn test_event_without_identity_serializes_nulls() {
        let event = AuditEvent::new(None, "/admin", "DELETE", AuditOutcome::Forbidden);
        let json = serde_json::to_value(&event).unwrap();

        assert!(json["userId"].is_null());
        assert!(json["role"].is_null());
        assert_eq!(json["outcome"], "FORBIDDEN");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryAuditSink::new();
        sink.record(&AuditEvent::new(None, "/admin", "GET", AuditOutcome::Granted));
        sink.record(
            &AuditEvent::new(None, "/admin", "GET", AuditOutcome::Failed).with_error("boom"),
        );

        assert_eq!(
            sink.outcomes(),
            vec![AuditOutcome::Granted, AuditOutcome::Failed]
        );
        assert_eq!(sink.events()[1].error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_tracing_sink_accepts_every_outcome() {
        let sink = TracingAuditSink;
        for outcome in [
            AuditOutcome::Granted,
            AuditOutcome::Forbidden,
            AuditOutcome::Completed,
            AuditOutcome::Failed,
        ] {
            sink.record(&AuditEvent::new(None, "/admin", "GET", outcome));
        }
    }
}
