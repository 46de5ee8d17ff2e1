//! Optimistic concurrency on period revisions.

use crate::error::{DomainError, DomainResult};

/// Expectation about a period's current revision when committing a close.
///
/// A close computes `new_revision = current + 1` and commits with
/// `Exact(current)`; a concurrent close of the same period observes a stale
/// revision and fails the check instead of producing a second revision for
/// the same close.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedRevision {
    /// Skip the check (idempotent short-circuits, migrations).
    Any,
    /// Require the period to still be at an exact revision.
    Exact(u32),
}

impl ExpectedRevision {
    pub fn matches(self, actual: u32) -> bool {
        match self {
            ExpectedRevision::Any => true,
            ExpectedRevision::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u32) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "revision check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mismatch_is_a_conflict() {
        assert!(ExpectedRevision::Exact(2).check(2).is_ok());
        assert!(ExpectedRevision::Any.check(7).is_ok());
        assert!(matches!(
            ExpectedRevision::Exact(2).check(3).unwrap_err(),
            DomainError::Conflict(_)
        ));
    }
}
