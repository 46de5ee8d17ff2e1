use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{ActorId, BranchId, DateRange, OrgId, PeriodId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Open,
    Closed,
}

/// A branch-scoped accounting period.
///
/// Mutated only through the create/close/reopen transitions on the period
/// store; posting operations never touch it. `revision` counts completed
/// closes: 0 while never closed, incremented by every close including
/// re-closes after a reopen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub range: DateRange,
    pub status: PeriodStatus,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    /// Metadata of the most recent close, preserved across reopens for audit.
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<ActorId>,
    pub reopened_at: Option<DateTime<Utc>>,
    pub reopened_by: Option<ActorId>,
}

impl Period {
    pub fn open(org_id: OrgId, branch_id: BranchId, range: DateRange) -> Self {
        Self {
            id: PeriodId::new(),
            org_id,
            branch_id,
            range,
            status: PeriodStatus::Open,
            revision: 0,
            created_at: Utc::now(),
            closed_at: None,
            closed_by: None,
            reopened_at: None,
            reopened_by: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }

    /// Does a CLOSED period lock this instant?
    pub fn locks(&self, at: DateTime<Utc>) -> bool {
        self.is_closed() && self.range.contains_instant(at)
    }
}
