use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{ItemId, LocationId, PeriodId};

/// On-hand quantity and value for one (item, location) as of a period's end
/// boundary, at one close revision.
///
/// Unique per (period, item, location, revision). Revisions strictly increase
/// across closes; earlier revisions stay queryable for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    pub period_id: PeriodId,
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub revision: u32,
    pub qty: Decimal,
    /// Weighted-average cost at generation time; zero when the item has never
    /// been costed.
    pub unit_cost: Decimal,
    /// Extended value: `qty × unit_cost`.
    pub value: Decimal,
    pub captured_at: DateTime<Utc>,
}

impl ValuationSnapshot {
    /// Composite uniqueness key.
    pub fn key(&self) -> (PeriodId, ItemId, LocationId, u32) {
        (self.period_id, self.item_id, self.location_id, self.revision)
    }
}
