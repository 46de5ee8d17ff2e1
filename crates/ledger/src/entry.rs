use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{
    ActorId, BranchId, DocumentId, DomainError, DomainResult, EntryId, ItemId, LocationId, OrgId,
};

/// Why a quantity moved. Closed enumeration: adding a posting type is a
/// compile-time-checked change (the bucket mapping below must be extended).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Purchase,
    PurchaseReversal,
    Sale,
    SaleReversal,
    Wastage,
    WastageReversal,
    Adjustment,
    CountVariance,
    TransferIn,
    TransferOut,
    ProductionConsume,
    ProductionProduce,
}

/// Aggregation bucket a reason code contributes to in movement summaries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementBucket {
    Received,
    Depleted,
    Wasted,
    Adjusted,
    Counted,
    TransferredIn,
    TransferredOut,
    Produced,
    Consumed,
}

impl ReasonCode {
    /// Explicit reason → bucket mapping table. Reversals land in the same
    /// bucket as the original; the sign of the quantity carries the reversal.
    pub fn bucket(self) -> MovementBucket {
        match self {
            ReasonCode::Purchase | ReasonCode::PurchaseReversal => MovementBucket::Received,
            ReasonCode::Sale | ReasonCode::SaleReversal => MovementBucket::Depleted,
            ReasonCode::Wastage | ReasonCode::WastageReversal => MovementBucket::Wasted,
            ReasonCode::Adjustment => MovementBucket::Adjusted,
            ReasonCode::CountVariance => MovementBucket::Counted,
            ReasonCode::TransferIn => MovementBucket::TransferredIn,
            ReasonCode::TransferOut => MovementBucket::TransferredOut,
            ReasonCode::ProductionProduce => MovementBucket::Produced,
            ReasonCode::ProductionConsume => MovementBucket::Consumed,
        }
    }

    /// Reason a correcting entry carries, for reasons that support reversal.
    pub fn reversal(self) -> Option<ReasonCode> {
        match self {
            ReasonCode::Purchase => Some(ReasonCode::PurchaseReversal),
            ReasonCode::Sale => Some(ReasonCode::SaleReversal),
            ReasonCode::Wastage => Some(ReasonCode::WastageReversal),
            _ => None,
        }
    }
}

/// Kind of source document that produced an entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoodsReceipt,
    SalesOrder,
    Stocktake,
    Transfer,
    ProductionBatch,
    Adjustment,
    Manual,
}

/// Link back to the document that produced the movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntrySource {
    pub kind: SourceKind,
    pub id: DocumentId,
}

impl EntrySource {
    pub fn new(kind: SourceKind, id: DocumentId) -> Self {
        Self { kind, id }
    }
}

/// Typed per-reason metadata attached to an entry.
///
/// Structured on purpose: a versioned enum instead of an untyped map, so the
/// payload keeps its shape across the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDetail {
    #[default]
    None,
    Receipt {
        supplier: Option<String>,
        reference: Option<String>,
    },
    Waste {
        cause: String,
    },
    CountVariance {
        counted: Decimal,
        expected: Decimal,
    },
    Transfer {
        counterpart_location: LocationId,
    },
    Production {
        batch: DocumentId,
    },
    Reversal {
        of_entry: EntryId,
        reason: String,
    },
}

/// A movement about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub item_id: ItemId,
    pub location_id: LocationId,
    /// Signed quantity; positive adds stock, negative removes it.
    pub qty: Decimal,
    pub reason: ReasonCode,
    pub source: EntrySource,
    /// Business timestamp the movement belongs to, not wall-clock insert time.
    pub effective_at: DateTime<Utc>,
    pub created_by: ActorId,
    #[serde(default)]
    pub detail: EntryDetail,
}

impl NewEntry {
    pub fn validate(&self) -> DomainResult<()> {
        if self.qty.is_zero() {
            return Err(DomainError::validation("entry quantity cannot be zero"));
        }
        Ok(())
    }
}

/// An immutable ledger fact. Never updated or deleted after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub qty: Decimal,
    pub reason: ReasonCode,
    pub source: EntrySource,
    pub effective_at: DateTime<Utc>,
    /// Wall-clock insertion time, for audit only; derivations use
    /// `effective_at`.
    pub recorded_at: DateTime<Utc>,
    pub created_by: ActorId,
    pub detail: EntryDetail,
}

impl LedgerEntry {
    pub fn from_new(id: EntryId, recorded_at: DateTime<Utc>, new: NewEntry) -> Self {
        Self {
            id,
            org_id: new.org_id,
            branch_id: new.branch_id,
            item_id: new.item_id,
            location_id: new.location_id,
            qty: new.qty,
            reason: new.reason,
            source: new.source,
            effective_at: new.effective_at,
            recorded_at,
            created_by: new.created_by,
            detail: new.detail,
        }
    }
}
