use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use stockbook_approvals::{ApprovalError, ApprovalWorkflow, CloseAuthorization, CloseRequestStore};
use stockbook_blockers::BlockingStateValidator;
use stockbook_core::{
    Actor, AlertId, BranchId, DateRange, DomainError, DomainResult, ExpectedRevision,
    LockOverride, LockStatus, OrgId, PeriodId, PeriodLockedError, PostingGuard, PrivilegeLevel,
    validate_reason,
};
use stockbook_costing::CostingOracle;
use stockbook_ledger::LedgerStore;
use stockbook_valuation::{
    MovementSummary, SnapshotGenerator, SnapshotStore, SummaryStore, ValuationSnapshot,
};

use crate::alert::{AlertStore, BlockedAlert};
use crate::audit::{AuditAction, AuditLog, AuditRecord};
use crate::error::CloseError;
use crate::event::{ClosedVia, OverrideScope, PeriodEvent, PeriodEventDetail, PeriodEventStore};
use crate::period::Period;
use crate::store::PeriodStore;

/// Which approval path a close attempt takes.
enum ClosePath<'a> {
    /// Requires an APPROVED close request.
    Approved,
    /// Privileged bypass with a recorded reason.
    Force { reason: &'a str },
}

/// Owns period records and drives the lifecycle:
/// `OPEN --close--> CLOSED --reopen--> OPEN --close--> CLOSED (revision+1)`.
///
/// Also the [`PostingGuard`] implementation: every ledger writer consults
/// this manager through that seam instead of reading period records.
pub struct PeriodManager<P, CR, L, C, SS, MS>
where
    P: PeriodStore,
    CR: CloseRequestStore,
    L: LedgerStore,
    C: CostingOracle,
    SS: SnapshotStore,
    MS: SummaryStore,
{
    periods: P,
    validator: BlockingStateValidator,
    approvals: ApprovalWorkflow<CR>,
    generator: SnapshotGenerator<L, C, SS, MS>,
    events: Arc<dyn PeriodEventStore>,
    audit: Arc<dyn AuditLog>,
    alerts: Arc<dyn AlertStore>,
}

impl<P, CR, L, C, SS, MS> PeriodManager<P, CR, L, C, SS, MS>
where
    P: PeriodStore,
    CR: CloseRequestStore,
    L: LedgerStore,
    C: CostingOracle,
    SS: SnapshotStore,
    MS: SummaryStore,
{
    /// Privilege tier required to reopen a closed period.
    pub const REOPEN_LEVEL: PrivilegeLevel = PrivilegeLevel::Manager;

    pub fn new(
        periods: P,
        validator: BlockingStateValidator,
        approvals: ApprovalWorkflow<CR>,
        generator: SnapshotGenerator<L, C, SS, MS>,
        events: Arc<dyn PeriodEventStore>,
        audit: Arc<dyn AuditLog>,
        alerts: Arc<dyn AlertStore>,
    ) -> Self {
        Self {
            periods,
            validator,
            approvals,
            generator,
            events,
            audit,
            alerts,
        }
    }

    /// The period with exactly these bounds, created OPEN when missing.
    pub fn find_or_create_open(
        &self,
        org_id: OrgId,
        branch_id: BranchId,
        range: DateRange,
        actor: &Actor,
    ) -> DomainResult<Period> {
        if let Some(existing) = self.periods.find_exact(branch_id, &range) {
            return Ok(existing);
        }

        let period = Period::open(org_id, branch_id, range);
        self.periods.insert(period.clone())?;
        self.events.append(PeriodEvent::new(
            period.id,
            actor.id,
            PeriodEventDetail::Created,
        ));
        self.audit.record(AuditRecord::new(
            org_id,
            actor.id,
            AuditAction::PeriodCreated,
            "period",
            period.id.to_string(),
            None,
            json!({ "branch_id": branch_id, "range": range }),
        ));
        info!(period_id = %period.id, branch_id = %branch_id, range = %range, "period created");
        Ok(period)
    }

    pub fn period(&self, period_id: PeriodId) -> Option<Period> {
        self.periods.get(period_id)
    }

    /// Close the period covering `range`, gated by the approval workflow.
    ///
    /// Idempotent: when a CLOSED period with identical bounds exists, it is
    /// returned unchanged. Any failure leaves the period OPEN and the close
    /// retryable.
    pub fn close(
        &self,
        org_id: OrgId,
        branch_id: BranchId,
        range: DateRange,
        actor: &Actor,
    ) -> Result<Period, CloseError> {
        self.close_inner(org_id, branch_id, range, actor, ClosePath::Approved)
    }

    /// Close bypassing the approval workflow. Structurally distinct from
    /// [`close`](Self::close): requires the highest privilege tier and a
    /// recorded reason, and audits the bypass as an override.
    pub fn force_close(
        &self,
        org_id: OrgId,
        branch_id: BranchId,
        range: DateRange,
        actor: &Actor,
        reason: &str,
    ) -> Result<Period, CloseError> {
        self.close_inner(org_id, branch_id, range, actor, ClosePath::Force { reason })
    }

    fn close_inner(
        &self,
        org_id: OrgId,
        branch_id: BranchId,
        range: DateRange,
        actor: &Actor,
        path: ClosePath<'_>,
    ) -> Result<Period, CloseError> {
        // Idempotent short-circuit: same bounds, already closed.
        if let Some(existing) = self.periods.find_exact(branch_id, &range) {
            if existing.is_closed() {
                info!(period_id = %existing.id, "close is a no-op, period already closed");
                return Ok(existing);
            }
        }

        let period = self.find_or_create_open(org_id, branch_id, range, actor)?;

        let report = self.validator.evaluate(branch_id, &range);
        if report.is_blocked() {
            let rules: Vec<(String, usize)> = report
                .blocking_items()
                .map(|i| (i.rule.to_string(), i.count))
                .collect();
            self.alerts
                .insert(BlockedAlert::new(org_id, branch_id, period.id, report.clone()));
            self.events.append(PeriodEvent::new(
                period.id,
                actor.id,
                PeriodEventDetail::CloseBlocked { rules: rules.clone() },
            ));
            self.audit.record(AuditRecord::new(
                org_id,
                actor.id,
                AuditAction::CloseBlocked,
                "period",
                period.id.to_string(),
                None,
                json!({ "rules": rules }),
            ));
            warn!(period_id = %period.id, ?rules, "close blocked");
            return Err(CloseError::Blocked(report));
        }

        let authorization = match path {
            ClosePath::Approved => self.approvals.authorize_close(period.id),
            ClosePath::Force { reason } => {
                self.approvals.authorize_force_close(period.id, actor, reason)
            }
        }
        .map_err(|e| match e {
            ApprovalError::Required(msg) => CloseError::ApprovalRequired(msg),
            ApprovalError::Domain(err) => CloseError::Domain(err),
        })?;

        // Snapshot/summary rows land before the status flip; if the flip
        // loses a race the rows at this revision are orphaned until the next
        // attempt re-derives and swallows them as duplicates. Readers resolve
        // revisions through the period record, so an uncommitted revision is
        // never handed out.
        let new_revision = period.revision + 1;
        self.generator
            .generate(org_id, branch_id, period.id, &range, new_revision);

        let closed = self.periods.mark_closed(
            period.id,
            ExpectedRevision::Exact(period.revision),
            actor.id,
            Utc::now(),
        )?;

        let (via, action, reason) = match &authorization {
            CloseAuthorization::Approved { request_id } => (
                ClosedVia::Approval {
                    request_id: *request_id,
                },
                AuditAction::PeriodClosed,
                None,
            ),
            CloseAuthorization::ForceClose { reason, .. } => {
                // The bypass is its own audit fact, separate from the close.
                self.events.append(PeriodEvent::new(
                    period.id,
                    actor.id,
                    PeriodEventDetail::OverrideUsed {
                        reason: reason.clone(),
                        scope: OverrideScope::ApprovalBypass,
                    },
                ));
                (
                    ClosedVia::ForceClose {
                        reason: reason.clone(),
                    },
                    AuditAction::PeriodForceClosed,
                    Some(reason.clone()),
                )
            }
        };

        self.events.append(PeriodEvent::new(
            period.id,
            actor.id,
            PeriodEventDetail::Closed {
                revision: closed.revision,
                via,
            },
        ));
        self.audit.record(AuditRecord::new(
            org_id,
            actor.id,
            action,
            "period",
            period.id.to_string(),
            reason,
            json!({ "range": range, "revision": closed.revision }),
        ));
        info!(
            period_id = %closed.id,
            revision = closed.revision,
            force = matches!(authorization, CloseAuthorization::ForceClose { .. }),
            "period closed"
        );
        Ok(closed)
    }

    /// Reopen a CLOSED period with a mandatory reason. Prior snapshots,
    /// summaries and close metadata stay untouched.
    pub fn reopen(&self, period_id: PeriodId, actor: &Actor, reason: &str) -> DomainResult<Period> {
        validate_reason(reason)?;
        if !actor.level.is_at_least(Self::REOPEN_LEVEL) {
            return Err(DomainError::Unauthorized);
        }

        let reopened = self.periods.mark_reopened(period_id, actor.id, Utc::now())?;

        self.events.append(PeriodEvent::new(
            period_id,
            actor.id,
            PeriodEventDetail::Reopened {
                reason: reason.to_string(),
            },
        ));
        self.audit.record(AuditRecord::new(
            reopened.org_id,
            actor.id,
            AuditAction::PeriodReopened,
            "period",
            period_id.to_string(),
            Some(reason.to_string()),
            json!({ "revision": reopened.revision }),
        ));
        info!(period_id = %period_id, revision = reopened.revision, "period reopened");
        Ok(reopened)
    }

    /// Snapshot rows for a period. `revision = None` resolves to the latest
    /// committed revision via the period record, so a partially generated
    /// revision is never handed out.
    pub fn snapshots(
        &self,
        period_id: PeriodId,
        revision: Option<u32>,
    ) -> DomainResult<Vec<ValuationSnapshot>> {
        let revision = self.resolve_revision(period_id, revision)?;
        Ok(self.generator.snapshot_store().snapshots_at(period_id, revision))
    }

    /// Summary rows for a period, same revision resolution as `snapshots`.
    pub fn summaries(
        &self,
        period_id: PeriodId,
        revision: Option<u32>,
    ) -> DomainResult<Vec<MovementSummary>> {
        let revision = self.resolve_revision(period_id, revision)?;
        Ok(self.generator.summary_store().summaries_at(period_id, revision))
    }

    fn resolve_revision(&self, period_id: PeriodId, revision: Option<u32>) -> DomainResult<u32> {
        let period = self.periods.get(period_id).ok_or(DomainError::NotFound)?;
        match revision {
            None => Ok(period.revision),
            Some(r) if r <= period.revision => Ok(r),
            Some(r) => Err(DomainError::validation(format!(
                "revision {r} has not been committed (latest is {})",
                period.revision
            ))),
        }
    }

    pub fn events_for(&self, period_id: PeriodId) -> Vec<PeriodEvent> {
        self.events.for_period(period_id)
    }

    pub fn alerts_for(&self, period_id: PeriodId) -> Vec<BlockedAlert> {
        self.alerts.for_period(period_id)
    }

    /// Mark a blocked-close alert as seen. Returns `false` when the alert
    /// does not exist or was already acknowledged; the first acknowledgement
    /// sticks.
    pub fn acknowledge_alert(&self, alert_id: AlertId, actor: &Actor) -> bool {
        let acknowledged = self.alerts.acknowledge(alert_id, actor.id);
        if acknowledged {
            info!(alert_id = %alert_id, actor = %actor.id, "blocked-close alert acknowledged");
        }
        acknowledged
    }

    /// The approval workflow, for drafting/submitting/deciding requests.
    pub fn approvals(&self) -> &ApprovalWorkflow<CR> {
        &self.approvals
    }
}

impl<P, CR, L, C, SS, MS> PostingGuard for PeriodManager<P, CR, L, C, SS, MS>
where
    P: PeriodStore,
    CR: CloseRequestStore,
    L: LedgerStore,
    C: CostingOracle,
    SS: SnapshotStore,
    MS: SummaryStore,
{
    fn check_lock(&self, branch_id: BranchId, effective_at: DateTime<Utc>) -> LockStatus {
        match self.periods.closed_covering(branch_id, effective_at) {
            Some(period) => LockStatus::locked_by(
                period.id,
                format!("period {} is closed", period.range),
            ),
            None => LockStatus::open(),
        }
    }

    fn enforce_lock(
        &self,
        branch_id: BranchId,
        effective_at: DateTime<Utc>,
        lock_override: Option<&LockOverride>,
    ) -> Result<(), PeriodLockedError> {
        let Some(period) = self.periods.closed_covering(branch_id, effective_at) else {
            return Ok(());
        };

        let Some(ov) = lock_override else {
            return Err(PeriodLockedError::Locked {
                branch_id,
                period_id: period.id,
                effective_at,
            });
        };

        ov.validate().map_err(PeriodLockedError::OverrideRejected)?;

        self.events.append(PeriodEvent::new(
            period.id,
            ov.actor.id,
            PeriodEventDetail::OverrideUsed {
                reason: ov.reason.clone(),
                scope: OverrideScope::PostingLock { effective_at },
            },
        ));
        self.audit.record(AuditRecord::new(
            period.org_id,
            ov.actor.id,
            AuditAction::LockOverridden,
            "period",
            period.id.to_string(),
            Some(ov.reason.clone()),
            json!({ "branch_id": branch_id, "effective_at": effective_at }),
        ));
        warn!(
            period_id = %period.id,
            actor = %ov.actor.id,
            effective_at = %effective_at,
            "posting lock overridden"
        );
        Ok(())
    }
}
