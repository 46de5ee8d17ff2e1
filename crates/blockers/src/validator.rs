use tracing::debug;

use stockbook_core::{BranchId, DateRange};

use crate::report::BlockingStateReport;
use crate::rules::{standard_rules, BlockerRule};
use crate::sources::Sources;

/// Runs the rule set against the source views for a close candidate.
pub struct BlockingStateValidator {
    sources: Sources,
    rules: Vec<Box<dyn BlockerRule>>,
}

impl BlockingStateValidator {
    /// Validator with the standard rule set.
    pub fn new(sources: Sources) -> Self {
        Self::with_rules(sources, standard_rules())
    }

    /// Validator with an explicit rule set (tests, feature-gated rules).
    pub fn with_rules(sources: Sources, rules: Vec<Box<dyn BlockerRule>>) -> Self {
        Self { sources, rules }
    }

    /// Evaluate every rule, read-only. Rules never see each other's output.
    pub fn evaluate(&self, branch_id: BranchId, range: &DateRange) -> BlockingStateReport {
        let items = self
            .rules
            .iter()
            .filter_map(|rule| {
                let item = rule.evaluate(&self.sources, branch_id, range);
                if let Some(ref item) = item {
                    debug!(
                        rule = rule.id(),
                        severity = ?item.severity,
                        count = item.count,
                        "blocker rule matched"
                    );
                }
                item
            })
            .collect();

        let report = BlockingStateReport::new(branch_id, *range, items);
        debug!(branch_id = %branch_id, range = %range, state = ?report.state, "blocking-state evaluation");
        report
    }
}
