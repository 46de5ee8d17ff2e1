//! `stockbook-periods` — period lifecycle management and the audit trail.
//!
//! Owns period records, enforces the posting lock against the ledger,
//! orchestrates close (blockers → approval → valuation → status flip) and
//! reopen, and writes the two deliberately redundant logs: the period-scoped
//! event log and the org-wide audit log.

pub mod alert;
pub mod audit;
pub mod error;
pub mod event;
pub mod manager;
pub mod period;
pub mod store;

pub use alert::{AlertStore, BlockedAlert, InMemoryAlertStore};
pub use audit::{AuditAction, AuditLog, AuditRecord, InMemoryAuditLog};
pub use error::CloseError;
pub use event::{
    ClosedVia, InMemoryPeriodEventStore, OverrideScope, PeriodEvent, PeriodEventDetail,
    PeriodEventStore, PeriodEventType,
};
pub use manager::PeriodManager;
pub use period::{Period, PeriodStatus};
pub use store::{InMemoryPeriodStore, PeriodStore};
