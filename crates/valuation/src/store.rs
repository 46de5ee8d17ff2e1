use std::collections::HashMap;
use std::sync::RwLock;

use stockbook_core::{ItemId, LocationId, PeriodId};

use crate::snapshot::ValuationSnapshot;
use crate::summary::MovementSummary;

/// Result of a try-insert against a unique key.
///
/// The duplicate case is first-class instead of a caught storage error: a
/// retry after a partial failure finds its earlier rows and reports
/// `AlreadyExists`, which callers treat as idempotent success.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Revisioned snapshot rows. Insert-only; rows are never updated or deleted.
pub trait SnapshotStore: Send + Sync {
    /// Insert unless the (period, item, location, revision) key exists.
    fn try_insert(&self, snapshot: ValuationSnapshot) -> InsertOutcome;

    /// All rows for a period at one revision.
    fn snapshots_at(&self, period_id: PeriodId, revision: u32) -> Vec<ValuationSnapshot>;

    fn get(
        &self,
        period_id: PeriodId,
        item_id: ItemId,
        location_id: LocationId,
        revision: u32,
    ) -> Option<ValuationSnapshot>;
}

/// Revisioned summary rows. Insert-only, same key semantics.
pub trait SummaryStore: Send + Sync {
    fn try_insert(&self, summary: MovementSummary) -> InsertOutcome;

    fn summaries_at(&self, period_id: PeriodId, revision: u32) -> Vec<MovementSummary>;

    fn get(
        &self,
        period_id: PeriodId,
        item_id: Option<ItemId>,
        revision: u32,
    ) -> Option<MovementSummary>;
}

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    rows: RwLock<HashMap<(PeriodId, ItemId, LocationId, u32), ValuationSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn try_insert(&self, snapshot: ValuationSnapshot) -> InsertOutcome {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows.entry(snapshot.key()) {
            std::collections::hash_map::Entry::Occupied(_) => InsertOutcome::AlreadyExists,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(snapshot);
                InsertOutcome::Inserted
            }
        }
    }

    fn snapshots_at(&self, period_id: PeriodId, revision: u32) -> Vec<ValuationSnapshot> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<_> = rows
            .values()
            .filter(|s| s.period_id == period_id && s.revision == revision)
            .cloned()
            .collect();
        out.sort_by_key(|s| (s.item_id, s.location_id));
        out
    }

    fn get(
        &self,
        period_id: PeriodId,
        item_id: ItemId,
        location_id: LocationId,
        revision: u32,
    ) -> Option<ValuationSnapshot> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(&(period_id, item_id, location_id, revision)).cloned()
    }
}

#[derive(Debug, Default)]
pub struct InMemorySummaryStore {
    rows: RwLock<HashMap<(PeriodId, Option<ItemId>, u32), MovementSummary>>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SummaryStore for InMemorySummaryStore {
    fn try_insert(&self, summary: MovementSummary) -> InsertOutcome {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows.entry(summary.key()) {
            std::collections::hash_map::Entry::Occupied(_) => InsertOutcome::AlreadyExists,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(summary);
                InsertOutcome::Inserted
            }
        }
    }

    fn summaries_at(&self, period_id: PeriodId, revision: u32) -> Vec<MovementSummary> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<_> = rows
            .values()
            .filter(|s| s.period_id == period_id && s.revision == revision)
            .cloned()
            .collect();
        // Branch-total row (item None) first, then per item.
        out.sort_by_key(|s| s.item_id);
        out
    }

    fn get(
        &self,
        period_id: PeriodId,
        item_id: Option<ItemId>,
        revision: u32,
    ) -> Option<MovementSummary> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(&(period_id, item_id, revision)).cloned()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn try_insert(&self, snapshot: ValuationSnapshot) -> InsertOutcome {
        (**self).try_insert(snapshot)
    }

    fn snapshots_at(&self, period_id: PeriodId, revision: u32) -> Vec<ValuationSnapshot> {
        (**self).snapshots_at(period_id, revision)
    }

    fn get(
        &self,
        period_id: PeriodId,
        item_id: ItemId,
        location_id: LocationId,
        revision: u32,
    ) -> Option<ValuationSnapshot> {
        (**self).get(period_id, item_id, location_id, revision)
    }
}

impl<S: SummaryStore + ?Sized> SummaryStore for std::sync::Arc<S> {
    fn try_insert(&self, summary: MovementSummary) -> InsertOutcome {
        (**self).try_insert(summary)
    }

    fn summaries_at(&self, period_id: PeriodId, revision: u32) -> Vec<MovementSummary> {
        (**self).summaries_at(period_id, revision)
    }

    fn get(
        &self,
        period_id: PeriodId,
        item_id: Option<ItemId>,
        revision: u32,
    ) -> Option<MovementSummary> {
        (**self).get(period_id, item_id, revision)
    }
}
