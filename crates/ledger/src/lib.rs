//! `stockbook-ledger` — append-only stock movement ledger.
//!
//! On-hand quantity is never a mutable field: it is always the signed sum of
//! entries up to an `as_of` boundary. Entries are immutable facts; corrections
//! are new reversal entries, never updates or deletes.

pub mod entry;
pub mod error;
pub mod service;
pub mod store;

pub use entry::{
    EntryDetail, EntrySource, LedgerEntry, MovementBucket, NewEntry, ReasonCode, SourceKind,
};
pub use error::LedgerError;
pub use service::Ledger;
pub use store::{InMemoryLedgerStore, LedgerStore};
