//! Identifier types for warden entities.
//!
//! Every persisted security entity carries an [`EntityId`] assigned by
//! its backing store. Ids are opaque to callers: the only supported
//! operations are equality, ordering and display. Ordering matters:
//! [`SecuritySet`](crate::SecuritySet) iterates in ascending id order,
//! which keeps traversals and test output deterministic.
//!
//! # Id Assignment
//!
//! Ids are handed out by an [`IdSequence`], one per entity kind per
//! store. The sequence is an injected object owned by the store, not a
//! process-wide global, so two stores never contend and tests can rely
//! on ids starting from 1.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier of a persisted security entity.
///
/// Assigned exactly once, when the entity is first persisted. Never
/// reused within a store's lifetime.
///
/// # Example
///
/// ```
/// use warden_types::{EntityId, IdSequence};
///
/// let seq = IdSequence::new();
/// let a = seq.next_id();
/// let b = seq.next_id();
/// assert!(a < b);
/// assert_eq!(a.to_string(), "1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw id value.
    ///
    /// Intended for storage backends that persist ids externally and
    /// need to reconstruct them on load.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four node kinds of the authorization graph.
///
/// Used in error payloads (naming which entity a lookup missed) and to
/// scope one [`IdSequence`] per kind inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// An account that authenticates and is granted memberships.
    User,
    /// A named collection of users; the scoping key for role grants.
    Group,
    /// A named bundle of permissions.
    Role,
    /// An atomic capability checked at the decision point.
    Permission,
}

impl EntityKind {
    /// Lowercase noun, as used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Role => "role",
            Self::Permission => "permission",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic allocator of unique [`EntityId`]s.
///
/// Thread-safe; `next_id` never returns the same id twice. Stores own
/// one sequence per entity kind.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Creates a sequence whose first id is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hands out the next unique id.
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let seq = IdSequence::new();
        let ids: Vec<EntityId> = (0..10).map(|_| seq.next_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn sequences_are_independent() {
        let a = IdSequence::new();
        let b = IdSequence::new();
        assert_eq!(a.next_id(), b.next_id());
    }

    #[test]
    fn kind_display() {
        assert_eq!(EntityKind::Permission.to_string(), "permission");
        assert_eq!(EntityKind::User.as_str(), "user");
    }

    #[test]
    fn id_roundtrips_raw() {
        let id = EntityId::from_raw(42);
        assert_eq!(id.as_u64(), 42);
    }
}
