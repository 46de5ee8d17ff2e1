//! `stockbook-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error taxonomy, actor/privilege types, period
//! date ranges, and the posting-lock choke point every ledger writer must pass
//! through.

pub mod actor;
pub mod date_range;
pub mod error;
pub mod guard;
pub mod id;
pub mod revision;

pub use actor::{Actor, PrivilegeLevel};
pub use date_range::DateRange;
pub use error::{DomainError, DomainResult};
pub use guard::{
    LockOverride, LockStatus, PeriodLockedError, PostingGuard, validate_reason, MIN_REASON_LEN,
};
pub use id::{
    ActorId, AlertId, BranchId, CloseRequestId, DocumentId, EntryId, EventId, ItemId, LocationId,
    OrgId, PeriodId,
};
pub use revision::ExpectedRevision;
