//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $t:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", stringify!($t), e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_id!(
    /// Identifier of an organization (top-level tenant boundary).
    OrgId
);
uuid_id!(
    /// Identifier of a branch (the scope of periods and locks).
    BranchId
);
uuid_id!(
    /// Identifier of a stock item.
    ItemId
);
uuid_id!(
    /// Identifier of a storage location within a branch.
    LocationId
);
uuid_id!(
    /// Identifier of an accounting period record.
    PeriodId
);
uuid_id!(
    /// Identifier of a single ledger entry row.
    EntryId
);
uuid_id!(
    /// Identifier of an actor (user or service principal).
    ActorId
);
uuid_id!(
    /// Identifier of a source document (stocktake, transfer, receipt, ...).
    DocumentId
);
uuid_id!(
    /// Identifier of a close-request approval record.
    CloseRequestId
);
uuid_id!(
    /// Identifier of a period event / audit row.
    EventId
);
uuid_id!(
    /// Identifier of a blocked-close alert record.
    AlertId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let id = PeriodId::new();
        let parsed: PeriodId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_malformed_input() {
        let err = "not-a-uuid".parse::<BranchId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }
}
