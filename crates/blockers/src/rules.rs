//! The declarative rule set.
//!
//! Each rule owns one question and yields at most one report item. Rules are
//! evaluated independently; registering a new one is a single line in
//! [`standard_rules`].

use stockbook_core::{BranchId, DateRange};

use crate::report::{BlockerItem, BlockerSeverity};
use crate::sources::{
    AdjustmentStatus, GlPostingStatus, ProductionStatus, Sources, StocktakeStatus, TransferStatus,
};

/// One close-readiness rule.
pub trait BlockerRule: Send + Sync {
    fn id(&self) -> &'static str;

    /// Scan the sources for this rule's violation. Read-only.
    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem>;
}

/// Stocktakes still open/submitted/approved with a start date inside the
/// range must be completed or voided first, otherwise their variances would
/// post after the close.
pub struct OpenStocktakes;

impl BlockerRule for OpenStocktakes {
    fn id(&self) -> &'static str {
        "open_stocktakes"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .stocktakes
            .stocktakes(branch_id)
            .into_iter()
            .filter(|d| {
                matches!(
                    d.status,
                    StocktakeStatus::Open | StocktakeStatus::Submitted | StocktakeStatus::Approved
                ) && range.contains_instant(d.started_at)
            })
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Blocking,
            offenders,
            "complete or void the stocktakes before closing",
        )
    }
}

/// Production batches still in DRAFT created inside the range.
pub struct DraftProductionBatches;

impl BlockerRule for DraftProductionBatches {
    fn id(&self) -> &'static str {
        "draft_production_batches"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .production
            .production_batches(branch_id)
            .into_iter()
            .filter(|d| d.status == ProductionStatus::Draft && range.contains_instant(d.created_at))
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Blocking,
            offenders,
            "post or cancel the draft production batches",
        )
    }
}

/// Transfers shipped on or before the range end that never arrived.
pub struct InTransitTransfers;

impl BlockerRule for InTransitTransfers {
    fn id(&self) -> &'static str {
        "in_transit_transfers"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .transfers
            .transfers(branch_id)
            .into_iter()
            .filter(|d| {
                d.status == TransferStatus::InTransit
                    && d.shipped_at.is_some_and(|at| at < range.end_exclusive())
            })
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Blocking,
            offenders,
            "receive or cancel the in-transit transfers",
        )
    }
}

/// Stock adjustments awaiting approval inside the range. Soft: they may
/// legitimately be rejected after the close.
pub struct PendingAdjustments;

impl BlockerRule for PendingAdjustments {
    fn id(&self) -> &'static str {
        "pending_adjustments"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .adjustments
            .adjustments(branch_id)
            .into_iter()
            .filter(|d| {
                d.status == AdjustmentStatus::Pending && range.contains_instant(d.requested_at)
            })
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Warning,
            offenders,
            "approve or reject the pending adjustments",
        )
    }
}

/// Documents marked POSTED in the GL without a journal link: the posting
/// claims success but cannot be traced.
pub struct MissingJournalLinks;

impl BlockerRule for MissingJournalLinks {
    fn id(&self) -> &'static str {
        "missing_journal_links"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .gl
            .gl_documents(branch_id)
            .into_iter()
            .filter(|d| {
                d.status == GlPostingStatus::Posted
                    && d.journal_ref.is_none()
                    && range.contains_instant(d.effective_at)
            })
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Blocking,
            offenders,
            "repair the journal link on the posted documents",
        )
    }
}

/// Documents whose GL posting FAILED inside the range.
pub struct FailedGlPostings;

impl BlockerRule for FailedGlPostings {
    fn id(&self) -> &'static str {
        "failed_gl_postings"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .gl
            .gl_documents(branch_id)
            .into_iter()
            .filter(|d| {
                d.status == GlPostingStatus::Failed && range.contains_instant(d.effective_at)
            })
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Blocking,
            offenders,
            "retry the failed GL postings",
        )
    }
}

/// Documents whose GL posting was deliberately SKIPPED. Soft: skipping is an
/// allowed configuration, but worth surfacing at close time.
pub struct SkippedGlPostings;

impl BlockerRule for SkippedGlPostings {
    fn id(&self) -> &'static str {
        "skipped_gl_postings"
    }

    fn evaluate(
        &self,
        sources: &Sources,
        branch_id: BranchId,
        range: &DateRange,
    ) -> Option<BlockerItem> {
        let offenders = sources
            .gl
            .gl_documents(branch_id)
            .into_iter()
            .filter(|d| {
                d.status == GlPostingStatus::Skipped && range.contains_instant(d.effective_at)
            })
            .map(|d| d.id)
            .collect();
        BlockerItem::from_offenders(
            self.id(),
            BlockerSeverity::Warning,
            offenders,
            "review the documents whose GL posting was skipped",
        )
    }
}

/// The standard rule set, in evaluation order.
pub fn standard_rules() -> Vec<Box<dyn BlockerRule>> {
    vec![
        Box::new(OpenStocktakes),
        Box::new(DraftProductionBatches),
        Box::new(InTransitTransfers),
        Box::new(PendingAdjustments),
        Box::new(MissingJournalLinks),
        Box::new(FailedGlPostings),
        Box::new(SkippedGlPostings),
    ]
}
