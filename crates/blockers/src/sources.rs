//! Read-only views of collaborating subsystems.
//!
//! The validator never drives state changes in these subsystems; it only
//! scans for states that must not exist inside a period being closed.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, DocumentId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StocktakeStatus {
    Open,
    Submitted,
    Approved,
    Completed,
    Voided,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StocktakeDoc {
    pub id: DocumentId,
    pub status: StocktakeStatus,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Draft,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDoc {
    pub id: DocumentId,
    pub status: ProductionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Draft,
    InTransit,
    Received,
    Cancelled,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDoc {
    pub id: DocumentId,
    pub status: TransferStatus,
    pub shipped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentDoc {
    pub id: DocumentId,
    pub status: AdjustmentStatus,
    pub requested_at: DateTime<Utc>,
}

/// Ledger-adjacent document kinds whose GL posting status is observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlDocKind {
    GoodsReceipt,
    Waste,
    Depletion,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlPostingStatus {
    Pending,
    Posted,
    Failed,
    Skipped,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlDoc {
    pub id: DocumentId,
    pub kind: GlDocKind,
    pub status: GlPostingStatus,
    /// Link to the GL journal entry, present once posting succeeded.
    pub journal_ref: Option<DocumentId>,
    pub effective_at: DateTime<Utc>,
}

pub trait StocktakeSource: Send + Sync {
    fn stocktakes(&self, branch_id: BranchId) -> Vec<StocktakeDoc>;
}

pub trait ProductionSource: Send + Sync {
    fn production_batches(&self, branch_id: BranchId) -> Vec<ProductionDoc>;
}

pub trait TransferSource: Send + Sync {
    fn transfers(&self, branch_id: BranchId) -> Vec<TransferDoc>;
}

pub trait AdjustmentSource: Send + Sync {
    fn adjustments(&self, branch_id: BranchId) -> Vec<AdjustmentDoc>;
}

pub trait GlPostingSource: Send + Sync {
    fn gl_documents(&self, branch_id: BranchId) -> Vec<GlDoc>;
}

/// Bundle of source views handed to every rule.
#[derive(Clone)]
pub struct Sources {
    pub stocktakes: Arc<dyn StocktakeSource>,
    pub production: Arc<dyn ProductionSource>,
    pub transfers: Arc<dyn TransferSource>,
    pub adjustments: Arc<dyn AdjustmentSource>,
    pub gl: Arc<dyn GlPostingSource>,
}

#[derive(Debug, Default)]
struct InMemoryDocs {
    stocktakes: Vec<(BranchId, StocktakeDoc)>,
    production: Vec<(BranchId, ProductionDoc)>,
    transfers: Vec<(BranchId, TransferDoc)>,
    adjustments: Vec<(BranchId, AdjustmentDoc)>,
    gl: Vec<(BranchId, GlDoc)>,
}

/// In-memory implementation of every source trait, for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySources {
    docs: RwLock<InMemoryDocs>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stocktake(&self, branch_id: BranchId, doc: StocktakeDoc) {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.stocktakes.push((branch_id, doc));
    }

    pub fn push_production(&self, branch_id: BranchId, doc: ProductionDoc) {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.production.push((branch_id, doc));
    }

    pub fn push_transfer(&self, branch_id: BranchId, doc: TransferDoc) {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.transfers.push((branch_id, doc));
    }

    pub fn push_adjustment(&self, branch_id: BranchId, doc: AdjustmentDoc) {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.adjustments.push((branch_id, doc));
    }

    pub fn push_gl(&self, branch_id: BranchId, doc: GlDoc) {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.gl.push((branch_id, doc));
    }

    /// Replace a stocktake's status, e.g. voiding it to unblock a close.
    pub fn set_stocktake_status(&self, id: DocumentId, status: StocktakeStatus) {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        for (_, doc) in docs.stocktakes.iter_mut() {
            if doc.id == id {
                doc.status = status;
            }
        }
    }

    /// Bundle a shared handle into [`Sources`].
    pub fn as_sources(self: &Arc<Self>) -> Sources {
        Sources {
            stocktakes: self.clone(),
            production: self.clone(),
            transfers: self.clone(),
            adjustments: self.clone(),
            gl: self.clone(),
        }
    }
}

impl StocktakeSource for InMemorySources {
    fn stocktakes(&self, branch_id: BranchId) -> Vec<StocktakeDoc> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.stocktakes
            .iter()
            .filter(|(b, _)| *b == branch_id)
            .map(|(_, d)| *d)
            .collect()
    }
}

impl ProductionSource for InMemorySources {
    fn production_batches(&self, branch_id: BranchId) -> Vec<ProductionDoc> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.production
            .iter()
            .filter(|(b, _)| *b == branch_id)
            .map(|(_, d)| *d)
            .collect()
    }
}

impl TransferSource for InMemorySources {
    fn transfers(&self, branch_id: BranchId) -> Vec<TransferDoc> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.transfers
            .iter()
            .filter(|(b, _)| *b == branch_id)
            .map(|(_, d)| *d)
            .collect()
    }
}

impl AdjustmentSource for InMemorySources {
    fn adjustments(&self, branch_id: BranchId) -> Vec<AdjustmentDoc> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.adjustments
            .iter()
            .filter(|(b, _)| *b == branch_id)
            .map(|(_, d)| *d)
            .collect()
    }
}

impl GlPostingSource for InMemorySources {
    fn gl_documents(&self, branch_id: BranchId) -> Vec<GlDoc> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.gl
            .iter()
            .filter(|(b, _)| *b == branch_id)
            .map(|(_, d)| *d)
            .collect()
    }
}
