//! `stockbook-costing` — boundary to the costing oracle.
//!
//! The valuation generator consumes weighted-average cost through this trait;
//! how WAC is maintained (receipt-weighted recalculation, standard cost) is
//! outside this workspace. Implementations must be deterministic for a given
//! point-in-time state, otherwise re-running a close step would produce a
//! different valuation.

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use stockbook_core::{BranchId, ItemId, OrgId};

/// Supplier of the current weighted-average cost per item.
pub trait CostingOracle: Send + Sync {
    /// Current WAC for an item at a branch. `None` when the item has never
    /// been costed; the valuation generator then values it at zero.
    fn current_wac(&self, org_id: OrgId, branch_id: BranchId, item_id: ItemId) -> Option<Decimal>;
}

/// Fixed cost table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCostOracle {
    costs: RwLock<HashMap<(OrgId, BranchId, ItemId), Decimal>>,
}

impl InMemoryCostOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cost(&self, org_id: OrgId, branch_id: BranchId, item_id: ItemId, wac: Decimal) {
        let mut costs = self.costs.write().unwrap_or_else(|e| e.into_inner());
        costs.insert((org_id, branch_id, item_id), wac);
    }
}

impl CostingOracle for InMemoryCostOracle {
    fn current_wac(&self, org_id: OrgId, branch_id: BranchId, item_id: ItemId) -> Option<Decimal> {
        let costs = self.costs.read().unwrap_or_else(|e| e.into_inner());
        costs.get(&(org_id, branch_id, item_id)).copied()
    }
}

impl<C: CostingOracle + ?Sized> CostingOracle for std::sync::Arc<C> {
    fn current_wac(&self, org_id: OrgId, branch_id: BranchId, item_id: ItemId) -> Option<Decimal> {
        (**self).current_wac(org_id, branch_id, item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn returns_none_for_uncosted_items() {
        let oracle = InMemoryCostOracle::new();
        assert_eq!(
            oracle.current_wac(OrgId::new(), BranchId::new(), ItemId::new()),
            None
        );
    }

    #[test]
    fn latest_set_cost_wins() {
        let oracle = InMemoryCostOracle::new();
        let (org_id, branch_id, item_id) = (OrgId::new(), BranchId::new(), ItemId::new());

        oracle.set_cost(org_id, branch_id, item_id, dec!(2.50));
        oracle.set_cost(org_id, branch_id, item_id, dec!(2.75));
        assert_eq!(
            oracle.current_wac(org_id, branch_id, item_id),
            Some(dec!(2.75))
        );
    }
}
