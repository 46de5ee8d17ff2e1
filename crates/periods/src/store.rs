use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockbook_core::{
    ActorId, BranchId, DateRange, DomainError, DomainResult, ExpectedRevision, PeriodId,
};

use crate::period::{Period, PeriodStatus};

/// Storage for period records.
///
/// The only mutations are the three lifecycle transitions. `mark_closed`
/// carries a revision expectation: the store commits the flip only when the
/// period is still OPEN at the expected revision, which is what keeps two
/// concurrent closes from both committing.
pub trait PeriodStore: Send + Sync {
    /// Insert a new OPEN period. Fails with `Conflict` when the range
    /// overlaps an existing period of the same branch.
    fn insert(&self, period: Period) -> DomainResult<()>;

    fn get(&self, period_id: PeriodId) -> Option<Period>;

    /// The period with exactly these bounds, if any.
    fn find_exact(&self, branch_id: BranchId, range: &DateRange) -> Option<Period>;

    /// The CLOSED period containing the instant, if any.
    fn closed_covering(&self, branch_id: BranchId, at: DateTime<Utc>) -> Option<Period>;

    /// Compare-and-swap close: OPEN → CLOSED with `revision + 1`.
    fn mark_closed(
        &self,
        period_id: PeriodId,
        expected: ExpectedRevision,
        closed_by: ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<Period>;

    /// CLOSED → OPEN. Keeps the revision and the prior close metadata.
    fn mark_reopened(
        &self,
        period_id: PeriodId,
        reopened_by: ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<Period>;
}

/// In-memory period store for tests/dev.
///
/// A single write lock around each transition stands in for the relational
/// store's transaction; the overlap check and the insert are one critical
/// section.
#[derive(Debug, Default)]
pub struct InMemoryPeriodStore {
    periods: RwLock<HashMap<PeriodId, Period>>,
}

impl InMemoryPeriodStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PeriodStore for InMemoryPeriodStore {
    fn insert(&self, period: Period) -> DomainResult<()> {
        let mut periods = self.periods.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = periods
            .values()
            .find(|p| p.branch_id == period.branch_id && p.range.overlaps(&period.range))
        {
            return Err(DomainError::conflict(format!(
                "range {} overlaps period {} ({})",
                period.range, existing.id, existing.range
            )));
        }
        periods.insert(period.id, period);
        Ok(())
    }

    fn get(&self, period_id: PeriodId) -> Option<Period> {
        let periods = self.periods.read().unwrap_or_else(|e| e.into_inner());
        periods.get(&period_id).cloned()
    }

    fn find_exact(&self, branch_id: BranchId, range: &DateRange) -> Option<Period> {
        let periods = self.periods.read().unwrap_or_else(|e| e.into_inner());
        periods
            .values()
            .find(|p| p.branch_id == branch_id && p.range == *range)
            .cloned()
    }

    fn closed_covering(&self, branch_id: BranchId, at: DateTime<Utc>) -> Option<Period> {
        let periods = self.periods.read().unwrap_or_else(|e| e.into_inner());
        periods
            .values()
            .find(|p| p.branch_id == branch_id && p.locks(at))
            .cloned()
    }

    fn mark_closed(
        &self,
        period_id: PeriodId,
        expected: ExpectedRevision,
        closed_by: ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<Period> {
        let mut periods = self.periods.write().unwrap_or_else(|e| e.into_inner());
        let period = periods.get_mut(&period_id).ok_or(DomainError::NotFound)?;

        if period.status != PeriodStatus::Open {
            return Err(DomainError::conflict("period is not open"));
        }
        expected.check(period.revision)?;

        period.status = PeriodStatus::Closed;
        period.revision += 1;
        period.closed_at = Some(at);
        period.closed_by = Some(closed_by);
        Ok(period.clone())
    }

    fn mark_reopened(
        &self,
        period_id: PeriodId,
        reopened_by: ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<Period> {
        let mut periods = self.periods.write().unwrap_or_else(|e| e.into_inner());
        let period = periods.get_mut(&period_id).ok_or(DomainError::NotFound)?;

        if period.status != PeriodStatus::Closed {
            return Err(DomainError::invariant("only a closed period can be reopened"));
        }

        period.status = PeriodStatus::Open;
        period.reopened_at = Some(at);
        period.reopened_by = Some(reopened_by);
        Ok(period.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockbook_core::OrgId;

    fn range(m: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, m, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, m, 28).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn overlapping_ranges_are_rejected_per_branch() {
        let store = InMemoryPeriodStore::new();
        let org_id = OrgId::new();
        let branch_id = BranchId::new();

        store.insert(Period::open(org_id, branch_id, range(1))).unwrap();
        let overlap = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
        )
        .unwrap();
        let err = store
            .insert(Period::open(org_id, branch_id, overlap))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Same range on another branch is fine.
        store
            .insert(Period::open(org_id, BranchId::new(), range(1)))
            .unwrap();
    }

    #[test]
    fn cas_close_rejects_stale_revision() {
        let store = InMemoryPeriodStore::new();
        let period = Period::open(OrgId::new(), BranchId::new(), range(1));
        let period_id = period.id;
        store.insert(period).unwrap();

        let closed = store
            .mark_closed(period_id, ExpectedRevision::Exact(0), ActorId::new(), Utc::now())
            .unwrap();
        assert_eq!(closed.revision, 1);
        assert_eq!(closed.status, PeriodStatus::Closed);

        // A second attempt raced: the period is no longer open.
        let err = store
            .mark_closed(period_id, ExpectedRevision::Exact(0), ActorId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn reopen_keeps_revision_and_close_metadata() {
        let store = InMemoryPeriodStore::new();
        let period = Period::open(OrgId::new(), BranchId::new(), range(1));
        let period_id = period.id;
        store.insert(period).unwrap();

        let closer = ActorId::new();
        store
            .mark_closed(period_id, ExpectedRevision::Exact(0), closer, Utc::now())
            .unwrap();
        let reopened = store
            .mark_reopened(period_id, ActorId::new(), Utc::now())
            .unwrap();

        assert_eq!(reopened.status, PeriodStatus::Open);
        assert_eq!(reopened.revision, 1);
        assert_eq!(reopened.closed_by, Some(closer));
        assert!(reopened.closed_at.is_some());

        // Re-close increments again.
        let reclosed = store
            .mark_closed(period_id, ExpectedRevision::Exact(1), ActorId::new(), Utc::now())
            .unwrap();
        assert_eq!(reclosed.revision, 2);
    }

    #[test]
    fn reopen_of_open_period_is_an_invariant_violation() {
        let store = InMemoryPeriodStore::new();
        let period = Period::open(OrgId::new(), BranchId::new(), range(1));
        let period_id = period.id;
        store.insert(period).unwrap();

        assert!(matches!(
            store
                .mark_reopened(period_id, ActorId::new(), Utc::now())
                .unwrap_err(),
            DomainError::InvariantViolation(_)
        ));
    }

    #[test]
    fn closed_covering_finds_the_locking_period() {
        let store = InMemoryPeriodStore::new();
        let branch_id = BranchId::new();
        let period = Period::open(OrgId::new(), branch_id, range(1));
        let period_id = period.id;
        store.insert(period).unwrap();

        let inside = chrono::TimeZone::with_ymd_and_hms(&Utc, 2025, 1, 15, 12, 0, 0).unwrap();
        assert!(store.closed_covering(branch_id, inside).is_none());

        store
            .mark_closed(period_id, ExpectedRevision::Exact(0), ActorId::new(), Utc::now())
            .unwrap();
        assert_eq!(
            store.closed_covering(branch_id, inside).map(|p| p.id),
            Some(period_id)
        );
    }
}
