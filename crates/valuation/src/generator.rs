use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use stockbook_core::{BranchId, DateRange, ItemId, LocationId, OrgId, PeriodId};
use stockbook_costing::CostingOracle;
use stockbook_ledger::LedgerStore;

use crate::snapshot::ValuationSnapshot;
use crate::store::{InsertOutcome, SnapshotStore, SummaryStore};
use crate::summary::{MovementSummary, MovementTotals};

/// Row counts from one generation pass. `existing` rows were already present
/// from an earlier attempt at the same revision.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GenerationStats {
    pub snapshots_written: usize,
    pub snapshots_existing: usize,
    pub summaries_written: usize,
    pub summaries_existing: usize,
}

/// Derives snapshots and summaries for a period at a given revision.
///
/// Deterministic for a given ledger and costing state, and idempotent:
/// re-running after a partial failure re-derives identical rows and the
/// unique keys swallow the duplicates.
pub struct SnapshotGenerator<L, C, SS, MS>
where
    L: LedgerStore,
    C: CostingOracle,
    SS: SnapshotStore,
    MS: SummaryStore,
{
    ledger: L,
    costing: C,
    snapshots: SS,
    summaries: MS,
}

impl<L, C, SS, MS> SnapshotGenerator<L, C, SS, MS>
where
    L: LedgerStore,
    C: CostingOracle,
    SS: SnapshotStore,
    MS: SummaryStore,
{
    pub fn new(ledger: L, costing: C, snapshots: SS, summaries: MS) -> Self {
        Self {
            ledger,
            costing,
            snapshots,
            summaries,
        }
    }

    /// Generate snapshot and summary rows for `period_id` at `revision`.
    ///
    /// Snapshots capture on-hand as of the period-end boundary (end-of-day
    /// inclusive) for every (item, location) with ledger activity up to that
    /// boundary. Summaries bucket quantities whose *effective* date falls
    /// inside the window, one row per item plus the branch-total row.
    pub fn generate(
        &self,
        org_id: OrgId,
        branch_id: BranchId,
        period_id: PeriodId,
        range: &DateRange,
        revision: u32,
    ) -> GenerationStats {
        let entries = self.ledger.entries_for_branch(branch_id);
        let boundary = range.end_exclusive();
        let window_start = range.start_inclusive();
        let captured_at = Utc::now();

        // One pass over the branch ledger: on-hand up to the boundary and
        // window bucket totals. BTreeMaps keep generation order stable.
        let mut on_hand: BTreeMap<(ItemId, LocationId), Decimal> = BTreeMap::new();
        let mut item_totals: BTreeMap<ItemId, MovementTotals> = BTreeMap::new();
        let mut branch_totals = MovementTotals::default();

        for entry in &entries {
            if entry.effective_at < boundary {
                *on_hand
                    .entry((entry.item_id, entry.location_id))
                    .or_default() += entry.qty;
            }
            if entry.effective_at >= window_start && entry.effective_at < boundary {
                let bucket = entry.reason.bucket();
                item_totals
                    .entry(entry.item_id)
                    .or_default()
                    .add(bucket, entry.qty);
                branch_totals.add(bucket, entry.qty);
            }
        }

        let mut stats = GenerationStats::default();

        for ((item_id, location_id), qty) in on_hand {
            let unit_cost = self
                .costing
                .current_wac(org_id, branch_id, item_id)
                .unwrap_or(Decimal::ZERO);
            let outcome = self.snapshots.try_insert(ValuationSnapshot {
                period_id,
                item_id,
                location_id,
                revision,
                qty,
                unit_cost,
                value: qty * unit_cost,
                captured_at,
            });
            match outcome {
                InsertOutcome::Inserted => stats.snapshots_written += 1,
                InsertOutcome::AlreadyExists => stats.snapshots_existing += 1,
            }
        }

        for (item_id, totals) in item_totals {
            if totals.is_empty() {
                continue;
            }
            let outcome = self.summaries.try_insert(MovementSummary {
                period_id,
                item_id: Some(item_id),
                revision,
                totals,
                captured_at,
            });
            match outcome {
                InsertOutcome::Inserted => stats.summaries_written += 1,
                InsertOutcome::AlreadyExists => stats.summaries_existing += 1,
            }
        }

        if !branch_totals.is_empty() {
            match self.summaries.try_insert(MovementSummary {
                period_id,
                item_id: None,
                revision,
                totals: branch_totals,
                captured_at,
            }) {
                InsertOutcome::Inserted => stats.summaries_written += 1,
                InsertOutcome::AlreadyExists => stats.summaries_existing += 1,
            }
        }

        info!(
            period_id = %period_id,
            branch_id = %branch_id,
            revision,
            snapshots_written = stats.snapshots_written,
            snapshots_existing = stats.snapshots_existing,
            summaries_written = stats.summaries_written,
            summaries_existing = stats.summaries_existing,
            "valuation generation complete"
        );
        stats
    }

    pub fn snapshot_store(&self) -> &SS {
        &self.snapshots
    }

    pub fn summary_store(&self) -> &MS {
        &self.summaries
    }
}
