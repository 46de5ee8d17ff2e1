use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{ItemId, PeriodId};
use stockbook_ledger::MovementBucket;

/// Signed quantity totals per movement bucket for one period window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MovementTotals {
    pub received: Decimal,
    pub depleted: Decimal,
    pub wasted: Decimal,
    pub adjusted: Decimal,
    pub counted: Decimal,
    pub transferred_in: Decimal,
    pub transferred_out: Decimal,
    pub produced: Decimal,
    pub consumed: Decimal,
}

impl MovementTotals {
    pub fn add(&mut self, bucket: MovementBucket, qty: Decimal) {
        match bucket {
            MovementBucket::Received => self.received += qty,
            MovementBucket::Depleted => self.depleted += qty,
            MovementBucket::Wasted => self.wasted += qty,
            MovementBucket::Adjusted => self.adjusted += qty,
            MovementBucket::Counted => self.counted += qty,
            MovementBucket::TransferredIn => self.transferred_in += qty,
            MovementBucket::TransferredOut => self.transferred_out += qty,
            MovementBucket::Produced => self.produced += qty,
            MovementBucket::Consumed => self.consumed += qty,
        }
    }

    pub fn merge(&mut self, other: &MovementTotals) {
        self.received += other.received;
        self.depleted += other.depleted;
        self.wasted += other.wasted;
        self.adjusted += other.adjusted;
        self.counted += other.counted;
        self.transferred_in += other.transferred_in;
        self.transferred_out += other.transferred_out;
        self.produced += other.produced;
        self.consumed += other.consumed;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Movement aggregate for one period window, per item, plus a branch-total
/// row with `item_id = None`.
///
/// Unique per (period, item-or-none, revision), same revisioning as
/// snapshots. Bucketing uses the entries' *effective* date, not insertion
/// date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSummary {
    pub period_id: PeriodId,
    /// `None` marks the branch-total row.
    pub item_id: Option<ItemId>,
    pub revision: u32,
    pub totals: MovementTotals,
    pub captured_at: DateTime<Utc>,
}

impl MovementSummary {
    /// Composite uniqueness key.
    pub fn key(&self) -> (PeriodId, Option<ItemId>, u32) {
        (self.period_id, self.item_id, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn buckets_accumulate_signed_quantities() {
        let mut totals = MovementTotals::default();
        totals.add(MovementBucket::Received, dec!(100));
        totals.add(MovementBucket::Received, dec!(-25));
        totals.add(MovementBucket::Wasted, dec!(-10));

        assert_eq!(totals.received, dec!(75));
        assert_eq!(totals.wasted, dec!(-10));
        assert_eq!(totals.depleted, Decimal::ZERO);
        assert!(!totals.is_empty());
    }
}
