/// Append-only audit event emission.
///
/// The sink is an external collaborator with no domain logic; emission is
/// fire-and-forget and best-effort. A failed audit write must never block
/// or fail the user-facing operation, so errors are swallowed with a
/// `warn!`.
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Security-relevant actions recorded by the vault core. The serialized
/// names are the wire-level audit vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    PassphraseSetup,
    PassphraseSetupFailed,
    VaultUnlock,
    VaultUnlockFailed,
    MaxAttemptReached,
    Logout,
    SecretCreated,
    SecretUpdated,
    SecretDeleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::PassphraseSetup => "passphrase_setup",
            AuditAction::PassphraseSetupFailed => "passphrase_setup_failed",
            AuditAction::VaultUnlock => "vault_unlock",
            AuditAction::VaultUnlockFailed => "vault_unlock_failed",
            AuditAction::MaxAttemptReached => "max_attempt_reached",
            AuditAction::Logout => "logout",
            AuditAction::SecretCreated => "secret_created",
            AuditAction::SecretUpdated => "secret_updated",
            AuditAction::SecretDeleted => "secret_deleted",
        }
    }
}

/// One audit log entry. Metadata never contains plaintext secrets or key
/// material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor_id: String,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Trait for pluggable audit sinks.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one event to the log.
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

/// Emit an event, swallowing sink failures.
pub async fn emit(
    sink: &dyn AuditSink,
    actor_id: &str,
    action: AuditAction,
    metadata: BTreeMap<String, String>,
) {
    let event = AuditEvent {
        actor_id: actor_id.to_string(),
        action,
        timestamp: Utc::now(),
        metadata,
    };

    if let Err(e) = sink.record(event).await {
        warn!(action = action.as_str(), error = %e, "audit emission failed");
    }
}

/// In-memory sink for tests and embedded use.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: std::sync::Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions recorded so far, in emission order.
    pub fn actions(&self) -> Vec<AuditAction> {
        self.events
            .lock()
            .map(|events| events.iter().map(|e| e.action).collect())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| crate::error::VaultError::Store("audit sink poisoned".into()))?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&AuditAction::MaxAttemptReached).unwrap();
        assert_eq!(json, "\"max_attempt_reached\"");
        assert_eq!(AuditAction::SecretCreated.as_str(), "secret_created");
    }

    #[tokio::test]
    async fn test_memory_sink_records_in_order() {
        let sink = MemoryAuditSink::new();
        emit(&sink, "alice", AuditAction::PassphraseSetup, BTreeMap::new()).await;
        emit(&sink, "alice", AuditAction::VaultUnlock, BTreeMap::new()).await;

        assert_eq!(
            sink.actions(),
            vec![AuditAction::PassphraseSetup, AuditAction::VaultUnlock]
        );
    }

    #[tokio::test]
    async fn test_emit_swallows_sink_failure() {
        struct FailingSink;

        #[async_trait]
        impl AuditSink for FailingSink {
            async fn record(&self, _event: AuditEvent) -> Result<()> {
                Err(crate::error::VaultError::Store("down".into()))
            }
        }

        // Must not panic or propagate.
        emit(&FailingSink, "alice", AuditAction::Logout, BTreeMap::new()).await;
    }
}
