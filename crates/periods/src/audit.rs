//! Org-wide audit log.
//!
//! Redundant with the period event log on purpose: the period log powers
//! per-period history, this log powers org-wide compliance review.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockbook_core::{ActorId, EventId, OrgId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    PeriodCreated,
    PeriodClosed,
    PeriodForceClosed,
    PeriodReopened,
    LockOverridden,
    CloseBlocked,
}

/// One immutable org-wide audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: EventId,
    pub org_id: OrgId,
    pub actor_id: ActorId,
    pub action: AuditAction,
    pub target_kind: String,
    pub target_id: String,
    pub reason: Option<String>,
    /// Structured context (period range, revision, blocker rules, ...).
    pub context: JsonValue,
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        org_id: OrgId,
        actor_id: ActorId,
        action: AuditAction,
        target_kind: impl Into<String>,
        target_id: impl Into<String>,
        reason: Option<String>,
        context: JsonValue,
    ) -> Self {
        Self {
            id: EventId::new(),
            org_id,
            actor_id,
            action,
            target_kind: target_kind.into(),
            target_id: target_id.into(),
            reason,
            context,
            at: Utc::now(),
        }
    }
}

/// Append-only audit sink.
pub trait AuditLog: Send + Sync {
    fn record(&self, record: AuditRecord);
    fn for_org(&self, org_id: OrgId) -> Vec<AuditRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, record: AuditRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.push(record);
    }

    fn for_org(&self, org_id: OrgId) -> Vec<AuditRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|r| r.org_id == org_id)
            .cloned()
            .collect()
    }
}
