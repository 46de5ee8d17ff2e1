use thiserror::Error;

use stockbook_blockers::BlockingStateReport;
use stockbook_core::DomainError;

/// Failures of a close attempt. Every variant leaves the period OPEN; a
/// failed close is safely retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CloseError {
    /// Hard blockers exist. A durable alert was written before this error
    /// was returned, so the report stays discoverable.
    #[error("close blocked: {} rule(s) violated for {}", .0.items.len(), .0.range)]
    Blocked(BlockingStateReport),

    /// No approved close request and no valid force-close authorization.
    #[error("approval required: {0}")]
    ApprovalRequired(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
