use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use stockbook_core::{
    Actor, BranchId, DomainError, EntryId, ItemId, LocationId, LockOverride, PostingGuard,
    validate_reason,
};

use crate::entry::{EntryDetail, LedgerEntry, NewEntry};
use crate::error::LedgerError;
use crate::store::LedgerStore;

/// Posting facade over a [`LedgerStore`].
///
/// Every append passes through the period lock guard first; posting
/// collaborators never consult period records directly.
pub struct Ledger<S: LedgerStore> {
    store: S,
    guard: Arc<dyn PostingGuard>,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S, guard: Arc<dyn PostingGuard>) -> Self {
        Self { store, guard }
    }

    /// Append a movement after lock enforcement.
    ///
    /// `lock_override` lets a privileged actor post into a closed period; the
    /// guard audits the bypass before the append proceeds.
    pub fn post(
        &self,
        entry: NewEntry,
        allow_negative: bool,
        lock_override: Option<&LockOverride>,
    ) -> Result<EntryId, LedgerError> {
        entry.validate()?;
        self.guard
            .enforce_lock(entry.branch_id, entry.effective_at, lock_override)?;

        let id = self.store.append(entry.clone(), allow_negative)?;
        info!(
            entry_id = %id,
            branch_id = %entry.branch_id,
            item_id = %entry.item_id,
            location_id = %entry.location_id,
            qty = %entry.qty,
            reason = ?entry.reason,
            effective_at = %entry.effective_at,
            "ledger entry appended"
        );
        Ok(id)
    }

    /// Correct an earlier entry by appending its negation.
    ///
    /// Entries are never mutated; the correction is a new entry carrying the
    /// `*_REVERSAL` reason and a link to the original. The effective
    /// timestamp is the caller's choice so the correction lands in the period
    /// it belongs to, which may require an override if that period is closed.
    pub fn reverse(
        &self,
        entry_id: EntryId,
        actor: &Actor,
        reason_text: &str,
        effective_at: DateTime<Utc>,
        lock_override: Option<&LockOverride>,
    ) -> Result<EntryId, LedgerError> {
        validate_reason(reason_text).map_err(LedgerError::Domain)?;

        let original = self
            .store
            .get(entry_id)
            .ok_or(LedgerError::Domain(DomainError::NotFound))?;

        let reversal_reason = original.reason.reversal().ok_or_else(|| {
            LedgerError::Domain(DomainError::validation(format!(
                "reason {:?} is not reversible",
                original.reason
            )))
        })?;

        self.post(
            NewEntry {
                org_id: original.org_id,
                branch_id: original.branch_id,
                item_id: original.item_id,
                location_id: original.location_id,
                qty: -original.qty,
                reason: reversal_reason,
                source: original.source,
                effective_at,
                created_by: actor.id,
                detail: EntryDetail::Reversal {
                    of_entry: original.id,
                    reason: reason_text.to_string(),
                },
            },
            // A reversal of a debit adds stock back; a reversal of a credit
            // still respects the no-negative check.
            false,
            lock_override,
        )
    }

    pub fn on_hand(
        &self,
        branch_id: BranchId,
        item_id: ItemId,
        location_id: LocationId,
        as_of: Option<DateTime<Utc>>,
    ) -> Decimal {
        self.store.on_hand(branch_id, item_id, location_id, as_of)
    }

    pub fn entry(&self, id: EntryId) -> Option<LedgerEntry> {
        self.store.get(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntrySource, ReasonCode, SourceKind};
    use crate::store::InMemoryLedgerStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use stockbook_core::{
        ActorId, DocumentId, LockStatus, OrgId, PeriodId, PeriodLockedError, PrivilegeLevel,
    };

    /// Guard stub: everything open.
    struct OpenGuard;

    impl PostingGuard for OpenGuard {
        fn check_lock(&self, _branch_id: BranchId, _at: DateTime<Utc>) -> LockStatus {
            LockStatus::open()
        }

        fn enforce_lock(
            &self,
            _branch_id: BranchId,
            _at: DateTime<Utc>,
            _lock_override: Option<&LockOverride>,
        ) -> Result<(), PeriodLockedError> {
            Ok(())
        }
    }

    /// Guard stub: everything locked, honours valid overrides.
    struct LockedGuard {
        period_id: PeriodId,
    }

    impl PostingGuard for LockedGuard {
        fn check_lock(&self, _branch_id: BranchId, _at: DateTime<Utc>) -> LockStatus {
            LockStatus::locked_by(self.period_id, "closed")
        }

        fn enforce_lock(
            &self,
            branch_id: BranchId,
            at: DateTime<Utc>,
            lock_override: Option<&LockOverride>,
        ) -> Result<(), PeriodLockedError> {
            match lock_override {
                Some(ov) => ov.validate().map_err(PeriodLockedError::OverrideRejected),
                None => Err(PeriodLockedError::Locked {
                    branch_id,
                    period_id: self.period_id,
                    effective_at: at,
                }),
            }
        }
    }

    fn entry(qty: Decimal, reason: ReasonCode) -> NewEntry {
        NewEntry {
            org_id: OrgId::new(),
            branch_id: BranchId::new(),
            item_id: ItemId::new(),
            location_id: LocationId::new(),
            qty,
            reason,
            source: EntrySource::new(SourceKind::Manual, DocumentId::new()),
            effective_at: Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
            created_by: ActorId::new(),
            detail: EntryDetail::None,
        }
    }

    #[test]
    fn post_into_locked_period_fails_without_override() {
        let ledger = Ledger::new(
            InMemoryLedgerStore::new(),
            Arc::new(LockedGuard {
                period_id: PeriodId::new(),
            }),
        );

        let err = ledger
            .post(entry(dec!(5), ReasonCode::Purchase), false, None)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::PeriodLocked(PeriodLockedError::Locked { .. })
        ));
    }

    #[test]
    fn valid_override_allows_posting_into_locked_period() {
        let ledger = Ledger::new(
            InMemoryLedgerStore::new(),
            Arc::new(LockedGuard {
                period_id: PeriodId::new(),
            }),
        );

        let manager = Actor::new(ActorId::new(), "mgr", PrivilegeLevel::Manager);
        let ov = LockOverride::new(manager, "late supplier invoice");
        ledger
            .post(entry(dec!(5), ReasonCode::Purchase), false, Some(&ov))
            .unwrap();
    }

    #[test]
    fn reverse_appends_negated_entry_with_reversal_reason() {
        let ledger = Ledger::new(InMemoryLedgerStore::new(), Arc::new(OpenGuard));
        let actor = Actor::new(ActorId::new(), "sup", PrivilegeLevel::Supervisor);

        let original = entry(dec!(25), ReasonCode::Purchase);
        let branch_id = original.branch_id;
        let item_id = original.item_id;
        let location_id = original.location_id;
        let posted = ledger.post(original, false, None).unwrap();

        let reversal_id = ledger
            .reverse(
                posted,
                &actor,
                "duplicate goods receipt",
                Utc.with_ymd_and_hms(2025, 1, 16, 9, 0, 0).unwrap(),
                None,
            )
            .unwrap();

        let reversal = ledger.entry(reversal_id).unwrap();
        assert_eq!(reversal.qty, dec!(-25));
        assert_eq!(reversal.reason, ReasonCode::PurchaseReversal);
        assert!(matches!(
            reversal.detail,
            EntryDetail::Reversal { of_entry, .. } if of_entry == posted
        ));
        assert_eq!(
            ledger.on_hand(branch_id, item_id, location_id, None),
            Decimal::ZERO
        );
    }

    #[test]
    fn reverse_of_non_reversible_reason_is_rejected() {
        let ledger = Ledger::new(InMemoryLedgerStore::new(), Arc::new(OpenGuard));
        let actor = Actor::new(ActorId::new(), "sup", PrivilegeLevel::Supervisor);

        let posted = ledger
            .post(entry(dec!(5), ReasonCode::TransferIn), false, None)
            .unwrap();
        let err = ledger
            .reverse(
                posted,
                &actor,
                "entered against wrong branch",
                Utc::now(),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::Validation(_))
        ));
    }
}
