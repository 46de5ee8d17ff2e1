//! Actor identity and privilege tiers.

use serde::{Deserialize, Serialize};

use crate::id::ActorId;

/// Privilege tier of an actor, ordered from least to most privileged.
///
/// Tiers gate overrides: posting into a closed period requires at least
/// [`PrivilegeLevel::Manager`]; bypassing the close-approval workflow
/// (force-close) requires [`PrivilegeLevel::Admin`], the highest tier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeLevel {
    Staff,
    Supervisor,
    Manager,
    Admin,
}

impl PrivilegeLevel {
    pub fn is_at_least(self, required: PrivilegeLevel) -> bool {
        self >= required
    }
}

/// An acting identity attached to postings, overrides and lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub level: PrivilegeLevel,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, level: PrivilegeLevel) -> Self {
        Self {
            id,
            name: name.into(),
            level,
        }
    }
}
