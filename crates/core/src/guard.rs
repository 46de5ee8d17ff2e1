//! The posting-lock choke point.
//!
//! Every collaborator that writes to the ledger (receipts, waste, production,
//! counts, transfers) must consult [`PostingGuard`] with the entry's
//! *effective* business timestamp before appending. No caller is allowed to
//! query period records directly for lock decisions; the guard is the single
//! seam, so the period manager can be swapped without touching writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::{Actor, PrivilegeLevel};
use crate::error::{DomainError, DomainResult};
use crate::id::{BranchId, PeriodId};

/// Minimum length of a human-authored reason on overrides and reopens.
pub const MIN_REASON_LEN: usize = 10;

/// Validate a mandatory human-authored reason.
pub fn validate_reason(reason: &str) -> DomainResult<()> {
    if reason.trim().chars().count() < MIN_REASON_LEN {
        return Err(DomainError::validation(format!(
            "reason must be at least {MIN_REASON_LEN} characters"
        )));
    }
    Ok(())
}

/// Outcome of a lock probe for (branch, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    pub locked: bool,
    pub period_id: Option<PeriodId>,
    pub reason: Option<String>,
}

impl LockStatus {
    pub fn open() -> Self {
        Self {
            locked: false,
            period_id: None,
            reason: None,
        }
    }

    pub fn locked_by(period_id: PeriodId, reason: impl Into<String>) -> Self {
        Self {
            locked: true,
            period_id: Some(period_id),
            reason: Some(reason.into()),
        }
    }
}

/// A privileged, reason-justified bypass of the posting lock.
///
/// The guard validates the override itself (privilege tier, reason length);
/// a successful bypass is recorded as an `OVERRIDE_USED` event by the
/// implementation before the caller proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOverride {
    pub actor: Actor,
    pub reason: String,
}

impl LockOverride {
    /// Privilege tier required to post into a closed period.
    pub const REQUIRED_LEVEL: PrivilegeLevel = PrivilegeLevel::Manager;

    pub fn new(actor: Actor, reason: impl Into<String>) -> Self {
        Self {
            actor,
            reason: reason.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_reason(&self.reason)?;
        if !self.actor.level.is_at_least(Self::REQUIRED_LEVEL) {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }
}

/// Error raised when a posting targets a locked period and no valid override
/// was supplied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodLockedError {
    #[error("period {period_id} for branch {branch_id} is closed at {effective_at}")]
    Locked {
        branch_id: BranchId,
        period_id: PeriodId,
        effective_at: DateTime<Utc>,
    },

    /// The override itself failed validation (reason too short, actor not
    /// privileged enough).
    #[error("lock override rejected: {0}")]
    OverrideRejected(DomainError),
}

/// Lock consultation seam between posting collaborators and the period
/// lifecycle manager.
pub trait PostingGuard: Send + Sync {
    /// Is `effective_at` inside a CLOSED period of `branch`?
    fn check_lock(&self, branch_id: BranchId, effective_at: DateTime<Utc>) -> LockStatus;

    /// Fail with [`PeriodLockedError`] unless the timestamp is unlocked or a
    /// valid override is supplied. A used override must be audited by the
    /// implementation.
    fn enforce_lock(
        &self,
        branch_id: BranchId,
        effective_at: DateTime<Utc>,
        lock_override: Option<&LockOverride>,
    ) -> Result<(), PeriodLockedError>;
}
