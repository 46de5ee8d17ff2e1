//! `stockbook-approvals` — close-request approval workflow.
//!
//! A lightweight state machine gating who may trigger a period close:
//! DRAFT → SUBMITTED → {APPROVED, REJECTED}. A period carries at most one
//! non-terminal request at a time. A privileged force-close bypasses the
//! workflow entirely; the bypass is a structurally distinct authorization so
//! the period manager audits it as an override, not as an ordinary approval.

pub mod request;
pub mod store;
pub mod workflow;

pub use request::{CloseRequest, CloseRequestStatus};
pub use store::{CloseRequestStore, InMemoryCloseRequestStore};
pub use workflow::{ApprovalError, ApprovalWorkflow, CloseAuthorization};
