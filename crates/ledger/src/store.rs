use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use stockbook_core::{BranchId, DomainError, EntryId, ItemId, LocationId};

use crate::entry::{LedgerEntry, NewEntry};
use crate::error::LedgerError;

/// Append-only storage for ledger entries.
///
/// `append` is the only write. Implementations must serialize the
/// negative-balance pre-check and the insert for one (item, location), so two
/// concurrent debits cannot both pass the check and together overdraw.
pub trait LedgerStore: Send + Sync {
    /// Insert an entry, all-or-nothing.
    ///
    /// When the quantity is negative and `allow_negative` is false, the
    /// current on-hand is computed first and the append fails with
    /// [`LedgerError::InsufficientStock`] if the balance would go below zero.
    fn append(&self, entry: NewEntry, allow_negative: bool) -> Result<EntryId, LedgerError>;

    fn get(&self, id: EntryId) -> Option<LedgerEntry>;

    /// Signed sum of entries for (branch, item, location) with
    /// `effective_at <= as_of`; `None` means over all entries.
    fn on_hand(
        &self,
        branch_id: BranchId,
        item_id: ItemId,
        location_id: LocationId,
        as_of: Option<DateTime<Utc>>,
    ) -> Decimal;

    /// All entries for a branch, in insertion order. Derivations filter by
    /// effective timestamp themselves.
    fn entries_for_branch(&self, branch_id: BranchId) -> Vec<LedgerEntry>;
}

/// In-memory append-only ledger.
///
/// Intended for tests/dev. The single `RwLock` write section plays the role
/// a relational store's transaction isolation plays in production: the
/// balance pre-check and the insert are one critical section.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sum(
        entries: &[LedgerEntry],
        branch_id: BranchId,
        item_id: ItemId,
        location_id: LocationId,
        as_of: Option<DateTime<Utc>>,
    ) -> Decimal {
        entries
            .iter()
            .filter(|e| {
                e.branch_id == branch_id
                    && e.item_id == item_id
                    && e.location_id == location_id
                    && as_of.is_none_or(|cutoff| e.effective_at <= cutoff)
            })
            .map(|e| e.qty)
            .sum()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, entry: NewEntry, allow_negative: bool) -> Result<EntryId, LedgerError> {
        entry.validate()?;

        let mut entries = self
            .entries
            .write()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;

        if entry.qty < Decimal::ZERO && !allow_negative {
            let on_hand = Self::sum(
                &entries,
                entry.branch_id,
                entry.item_id,
                entry.location_id,
                None,
            );
            if on_hand + entry.qty < Decimal::ZERO {
                return Err(LedgerError::InsufficientStock {
                    item_id: entry.item_id,
                    location_id: entry.location_id,
                    on_hand,
                    requested: -entry.qty,
                });
            }
        }

        let id = EntryId::new();
        entries.push(LedgerEntry::from_new(id, Utc::now(), entry));
        Ok(id)
    }

    fn get(&self, id: EntryId) -> Option<LedgerEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().find(|e| e.id == id).cloned()
    }

    fn on_hand(
        &self,
        branch_id: BranchId,
        item_id: ItemId,
        location_id: LocationId,
        as_of: Option<DateTime<Utc>>,
    ) -> Decimal {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Self::sum(&entries, branch_id, item_id, location_id, as_of)
    }

    fn entries_for_branch(&self, branch_id: BranchId) -> Vec<LedgerEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .filter(|e| e.branch_id == branch_id)
            .cloned()
            .collect()
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<S> {
    fn append(&self, entry: NewEntry, allow_negative: bool) -> Result<EntryId, LedgerError> {
        (**self).append(entry, allow_negative)
    }

    fn get(&self, id: EntryId) -> Option<LedgerEntry> {
        (**self).get(id)
    }

    fn on_hand(
        &self,
        branch_id: BranchId,
        item_id: ItemId,
        location_id: LocationId,
        as_of: Option<DateTime<Utc>>,
    ) -> Decimal {
        (**self).on_hand(branch_id, item_id, location_id, as_of)
    }

    fn entries_for_branch(&self, branch_id: BranchId) -> Vec<LedgerEntry> {
        (**self).entries_for_branch(branch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryDetail, EntrySource, ReasonCode, SourceKind};
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use stockbook_core::{ActorId, DocumentId, OrgId};

    struct Fixture {
        org_id: OrgId,
        branch_id: BranchId,
        item_id: ItemId,
        location_id: LocationId,
        actor_id: ActorId,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                org_id: OrgId::new(),
                branch_id: BranchId::new(),
                item_id: ItemId::new(),
                location_id: LocationId::new(),
                actor_id: ActorId::new(),
            }
        }

        fn entry(&self, qty: Decimal, reason: ReasonCode, effective_at: DateTime<Utc>) -> NewEntry {
            NewEntry {
                org_id: self.org_id,
                branch_id: self.branch_id,
                item_id: self.item_id,
                location_id: self.location_id,
                qty,
                reason,
                source: EntrySource::new(SourceKind::Manual, DocumentId::new()),
                effective_at,
                created_by: self.actor_id,
                detail: EntryDetail::None,
            }
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn on_hand_is_the_signed_sum() {
        let store = InMemoryLedgerStore::new();
        let fx = Fixture::new();

        store
            .append(fx.entry(dec!(100), ReasonCode::Purchase, at(1, 9)), false)
            .unwrap();
        store
            .append(fx.entry(dec!(-30), ReasonCode::Sale, at(2, 12)), false)
            .unwrap();
        store
            .append(fx.entry(dec!(-10.5), ReasonCode::Wastage, at(3, 8)), false)
            .unwrap();

        assert_eq!(
            store.on_hand(fx.branch_id, fx.item_id, fx.location_id, None),
            dec!(59.5)
        );
    }

    #[test]
    fn on_hand_as_of_ignores_later_entries() {
        let store = InMemoryLedgerStore::new();
        let fx = Fixture::new();

        store
            .append(fx.entry(dec!(100), ReasonCode::Purchase, at(1, 9)), false)
            .unwrap();
        store
            .append(fx.entry(dec!(-40), ReasonCode::Sale, at(20, 12)), false)
            .unwrap();

        // Late posting inserted after, effective earlier.
        store
            .append(fx.entry(dec!(-5), ReasonCode::Wastage, at(2, 18)), false)
            .unwrap();

        assert_eq!(
            store.on_hand(fx.branch_id, fx.item_id, fx.location_id, Some(at(3, 0))),
            dec!(95)
        );
        assert_eq!(
            store.on_hand(fx.branch_id, fx.item_id, fx.location_id, None),
            dec!(55)
        );
    }

    #[test]
    fn overdraw_fails_and_writes_nothing() {
        let store = InMemoryLedgerStore::new();
        let fx = Fixture::new();

        store
            .append(fx.entry(dec!(10), ReasonCode::Purchase, at(1, 9)), false)
            .unwrap();

        let err = store
            .append(fx.entry(dec!(-15), ReasonCode::Sale, at(2, 9)), false)
            .unwrap_err();
        match err {
            LedgerError::InsufficientStock {
                on_hand, requested, ..
            } => {
                assert_eq!(on_hand, dec!(10));
                assert_eq!(requested, dec!(15));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(
            store.on_hand(fx.branch_id, fx.item_id, fx.location_id, None),
            dec!(10)
        );
        assert_eq!(store.entries_for_branch(fx.branch_id).len(), 1);
    }

    #[test]
    fn allow_negative_bypasses_the_check() {
        let store = InMemoryLedgerStore::new();
        let fx = Fixture::new();

        store
            .append(fx.entry(dec!(-3), ReasonCode::Adjustment, at(1, 9)), true)
            .unwrap();
        assert_eq!(
            store.on_hand(fx.branch_id, fx.item_id, fx.location_id, None),
            dec!(-3)
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let fx = Fixture::new();

        let err = store
            .append(fx.entry(dec!(0), ReasonCode::Adjustment, at(1, 9)), false)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::Validation(_))
        ));
    }

    proptest! {
        /// Property: on-hand equals the signed sum of entries with
        /// `effective_at <= as_of`, regardless of insertion order.
        #[test]
        fn sum_invariant_holds_for_any_insertion_order(
            quantities in prop::collection::vec((-50i64..200i64).prop_filter("non-zero", |q| *q != 0), 1..40),
            cutoff_day in 1u32..28,
        ) {
            let store = InMemoryLedgerStore::new();
            let fx = Fixture::new();

            let mut expected_total = Decimal::ZERO;
            let mut expected_at_cutoff = Decimal::ZERO;
            let cutoff = at(cutoff_day, 12);

            for (i, q) in quantities.iter().enumerate() {
                let qty = Decimal::from(*q);
                // Spread effective days around the cutoff irrespective of
                // insertion order.
                let day = (i as u32 * 7) % 28 + 1;
                store.append(fx.entry(qty, ReasonCode::Adjustment, at(day, 9)), true).unwrap();
                expected_total += qty;
                if at(day, 9) <= cutoff {
                    expected_at_cutoff += qty;
                }
            }

            prop_assert_eq!(
                store.on_hand(fx.branch_id, fx.item_id, fx.location_id, None),
                expected_total
            );
            prop_assert_eq!(
                store.on_hand(fx.branch_id, fx.item_id, fx.location_id, Some(cutoff)),
                expected_at_cutoff
            );
        }

        /// Property: a rejected overdraw never changes on-hand.
        #[test]
        fn failed_appends_leave_on_hand_unchanged(
            deposits in prop::collection::vec(1i64..100, 1..10),
            overdraw_by in 1i64..50,
        ) {
            let store = InMemoryLedgerStore::new();
            let fx = Fixture::new();

            let mut total = Decimal::ZERO;
            for q in &deposits {
                let qty = Decimal::from(*q);
                store.append(fx.entry(qty, ReasonCode::Purchase, at(1, 9)), false).unwrap();
                total += qty;
            }

            let debit = total + Decimal::from(overdraw_by);
            let res = store.append(fx.entry(-debit, ReasonCode::Sale, at(2, 9)), false);
            prop_assert!(res.is_err());
            prop_assert_eq!(
                store.on_hand(fx.branch_id, fx.item_id, fx.location_id, None),
                total
            );
        }
    }
}
