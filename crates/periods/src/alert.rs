//! Durable alerts for blocked close attempts.
//!
//! A `CloseBlocked` failure is rejected, but never silently: the report is
//! persisted so the blocker stays discoverable after the request is gone.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_blockers::BlockingStateReport;
use stockbook_core::{ActorId, AlertId, BranchId, OrgId, PeriodId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedAlert {
    pub id: AlertId,
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub period_id: PeriodId,
    pub report: BlockingStateReport,
    pub created_at: DateTime<Utc>,
    pub acknowledged_by: Option<ActorId>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl BlockedAlert {
    pub fn new(
        org_id: OrgId,
        branch_id: BranchId,
        period_id: PeriodId,
        report: BlockingStateReport,
    ) -> Self {
        Self {
            id: AlertId::new(),
            org_id,
            branch_id,
            period_id,
            report,
            created_at: Utc::now(),
            acknowledged_by: None,
            acknowledged_at: None,
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged_by.is_some()
    }
}

pub trait AlertStore: Send + Sync {
    fn insert(&self, alert: BlockedAlert);
    fn for_period(&self, period_id: PeriodId) -> Vec<BlockedAlert>;
    fn acknowledge(&self, alert_id: AlertId, actor_id: ActorId) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    alerts: RwLock<Vec<BlockedAlert>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for InMemoryAlertStore {
    fn insert(&self, alert: BlockedAlert) {
        let mut alerts = self.alerts.write().unwrap_or_else(|e| e.into_inner());
        alerts.push(alert);
    }

    fn for_period(&self, period_id: PeriodId) -> Vec<BlockedAlert> {
        let alerts = self.alerts.read().unwrap_or_else(|e| e.into_inner());
        alerts
            .iter()
            .filter(|a| a.period_id == period_id)
            .cloned()
            .collect()
    }

    fn acknowledge(&self, alert_id: AlertId, actor_id: ActorId) -> bool {
        let mut alerts = self.alerts.write().unwrap_or_else(|e| e.into_inner());
        for alert in alerts.iter_mut() {
            if alert.id == alert_id && !alert.is_acknowledged() {
                alert.acknowledged_by = Some(actor_id);
                alert.acknowledged_at = Some(Utc::now());
                return true;
            }
        }
        false
    }
}
