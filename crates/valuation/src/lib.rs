//! `stockbook-valuation` — period snapshot & movement summary generation.
//!
//! Derives per-period, per-revision valuation facts from the ledger,
//! deterministically and idempotently. Old revisions are retained forever;
//! a re-close writes the next revision, never overwrites.

pub mod generator;
pub mod snapshot;
pub mod store;
pub mod summary;

pub use generator::{GenerationStats, SnapshotGenerator};
pub use snapshot::ValuationSnapshot;
pub use store::{
    InMemorySnapshotStore, InMemorySummaryStore, InsertOutcome, SnapshotStore, SummaryStore,
};
pub use summary::{MovementSummary, MovementTotals};
