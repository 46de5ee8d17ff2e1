use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, DateRange, DocumentId};

/// How many offending ids a report item carries. Counts stay exact even when
/// samples are truncated.
pub const SAMPLE_LIMIT: usize = 7;

/// Hard violations block the close; soft issues only warn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerSeverity {
    Warning,
    Blocking,
}

/// Overall close-readiness classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingState {
    Ready,
    Warning,
    Blocked,
}

/// One violated rule: exact count, capped id sample, remediation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerItem {
    pub rule: String,
    pub severity: BlockerSeverity,
    pub count: usize,
    pub sample_ids: Vec<DocumentId>,
    pub remediation: String,
}

impl BlockerItem {
    /// Build an item from the full offender list, truncating the sample.
    /// Returns `None` when nothing offends, so rules read as a single call.
    pub fn from_offenders(
        rule: &'static str,
        severity: BlockerSeverity,
        mut offenders: Vec<DocumentId>,
        remediation: impl Into<String>,
    ) -> Option<Self> {
        if offenders.is_empty() {
            return None;
        }
        let count = offenders.len();
        offenders.truncate(SAMPLE_LIMIT);
        Some(Self {
            rule: rule.to_string(),
            severity,
            count,
            sample_ids: offenders,
            remediation: remediation.into(),
        })
    }
}

/// Full validation outcome for one (branch, range) close candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingStateReport {
    pub branch_id: BranchId,
    pub range: DateRange,
    pub state: BlockingState,
    pub items: Vec<BlockerItem>,
}

impl BlockingStateReport {
    pub fn new(branch_id: BranchId, range: DateRange, items: Vec<BlockerItem>) -> Self {
        let state = if items
            .iter()
            .any(|i| i.severity == BlockerSeverity::Blocking)
        {
            BlockingState::Blocked
        } else if !items.is_empty() {
            BlockingState::Warning
        } else {
            BlockingState::Ready
        };
        Self {
            branch_id,
            range,
            state,
            items,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.state == BlockingState::Blocked
    }

    pub fn blocking_items(&self) -> impl Iterator<Item = &BlockerItem> {
        self.items
            .iter()
            .filter(|i| i.severity == BlockerSeverity::Blocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn sample_is_capped_but_count_is_exact() {
        let offenders: Vec<DocumentId> = (0..20).map(|_| DocumentId::new()).collect();
        let item = BlockerItem::from_offenders(
            "open_stocktakes",
            BlockerSeverity::Blocking,
            offenders,
            "void or complete the stocktakes",
        )
        .unwrap();

        assert_eq!(item.count, 20);
        assert_eq!(item.sample_ids.len(), SAMPLE_LIMIT);
    }

    #[test]
    fn no_offenders_yields_no_item() {
        assert!(BlockerItem::from_offenders(
            "open_stocktakes",
            BlockerSeverity::Blocking,
            vec![],
            "n/a"
        )
        .is_none());
    }

    #[test]
    fn state_derivation_prefers_blocked_over_warning() {
        let warning = BlockerItem::from_offenders(
            "pending_adjustments",
            BlockerSeverity::Warning,
            vec![DocumentId::new()],
            "approve or reject",
        )
        .unwrap();
        let blocking = BlockerItem::from_offenders(
            "open_stocktakes",
            BlockerSeverity::Blocking,
            vec![DocumentId::new()],
            "void or complete",
        )
        .unwrap();

        let branch_id = BranchId::new();
        assert_eq!(
            BlockingStateReport::new(branch_id, range(), vec![]).state,
            BlockingState::Ready
        );
        assert_eq!(
            BlockingStateReport::new(branch_id, range(), vec![warning.clone()]).state,
            BlockingState::Warning
        );
        assert_eq!(
            BlockingStateReport::new(branch_id, range(), vec![warning, blocking]).state,
            BlockingState::Blocked
        );
    }
}
