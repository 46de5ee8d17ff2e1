use rust_decimal::Decimal;
use thiserror::Error;

use stockbook_core::{DomainError, ItemId, LocationId, PeriodLockedError};

/// Failures of ledger posting operations.
///
/// All variants are rejected-before-write: a failed append leaves the ledger
/// untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The append would drive on-hand below zero and `allow_negative` was not
    /// set.
    #[error(
        "insufficient stock for item {item_id} at location {location_id}: \
         on hand {on_hand}, requested {requested}"
    )]
    InsufficientStock {
        item_id: ItemId,
        location_id: LocationId,
        on_hand: Decimal,
        requested: Decimal,
    },

    /// The effective timestamp falls inside a closed period and no valid
    /// override was supplied.
    #[error(transparent)]
    PeriodLocked(#[from] PeriodLockedError),
}
