//! Security entities: User, Group, Role, Permission.
//!
//! All four are plain identity-plus-name value types. Relationship
//! edges (memberships, role grants, delegation, ternary relations) do
//! NOT live on the entities; they live in the store's index maps.
//! Entities can therefore be cheaply cloned into snapshots without
//! dragging half the graph along, and there is no per-model entity
//! subclassing.
//!
//! # Name Normalization
//!
//! Names are unique per entity kind, case-insensitively. To make that
//! cheap everywhere, names are lowercased at construction and stay
//! lowercase for the entity's lifetime. `User::new("Alice")` and
//! `User::new("ALICE")` are the same name.
//!
//! # Id Lifecycle
//!
//! A freshly constructed entity has no id (`id()` is `None`). The
//! backing store assigns one when the entity is persisted, and from
//! then on the id is immutable.

use crate::{EntityId, EntityKind};
use serde::{Deserialize, Serialize};

/// Common contract of the four authorization-graph node types.
///
/// Implemented by [`User`], [`Group`], [`Role`] and [`Permission`].
/// Generic code (sets, stores, managers) works against this trait.
pub trait SecurityEntity {
    /// The kind tag of this entity type.
    const KIND: EntityKind;

    /// Creates an unpersisted entity with the given (lowercased) name.
    ///
    /// The generic managers use this in place of per-type
    /// constructors; no reflection, no registry.
    #[must_use]
    fn named(name: &str) -> Self
    where
        Self: Sized;

    /// The store-assigned id, or `None` if not yet persisted.
    fn id(&self) -> Option<EntityId>;

    /// The lowercased, per-kind-unique name.
    fn name(&self) -> &str;

    /// Consumes the entity and returns it with its id assigned.
    ///
    /// Called by storage backends when persisting; ids are assigned
    /// exactly once.
    #[must_use]
    fn into_persisted(self, id: EntityId) -> Self;
}

macro_rules! security_entity {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            id: Option<EntityId>,
            name: String,
        }

        impl $name {
            /// Creates an unpersisted entity with the given name.
            ///
            /// The name is lowercased; the id stays unset until a
            /// store persists the entity.
            #[must_use]
            pub fn new(name: impl AsRef<str>) -> Self {
                Self {
                    id: None,
                    name: name.as_ref().to_lowercase(),
                }
            }
        }

        impl SecurityEntity for $name {
            const KIND: EntityKind = $kind;

            fn named(name: &str) -> Self {
                Self::new(name)
            }

            fn id(&self) -> Option<EntityId> {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn into_persisted(mut self, id: EntityId) -> Self {
                debug_assert!(self.id.is_none(), "entity id assigned twice");
                self.id = Some(id);
                self
            }
        }
    };
}

security_entity!(
    /// An account the authorization graph answers queries about.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_types::{SecurityEntity, User};
    ///
    /// let user = User::new("Alice");
    /// assert_eq!(user.name(), "alice");
    /// assert!(user.id().is_none());
    /// ```
    User,
    EntityKind::User
);

security_entity!(
    /// A named collection of users; the unit role grants are scoped to.
    Group,
    EntityKind::Group
);

security_entity!(
    /// A named bundle of permissions, granted to groups (dynamic
    /// model) or to user/group pairs (turbine model).
    Role,
    EntityKind::Role
);

security_entity!(
    /// An atomic capability, the leaf of every authorization query.
    Permission,
    EntityKind::Permission
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercased() {
        assert_eq!(Group::new("FRONT_DESK").name(), "front_desk");
        assert_eq!(Role::new("Receptionist").name(), "receptionist");
    }

    #[test]
    fn id_assigned_on_persist() {
        let p = Permission::new("answer_phone");
        assert!(p.id().is_none());
        let p = p.into_persisted(EntityId::from_raw(7));
        assert_eq!(p.id(), Some(EntityId::from_raw(7)));
    }

    #[test]
    fn equality_covers_id_and_name() {
        let a = User::new("bob").into_persisted(EntityId::from_raw(1));
        let b = User::new("bob").into_persisted(EntityId::from_raw(2));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn serde_roundtrip() {
        let role = Role::new("admin").into_persisted(EntityId::from_raw(3));
        let json = serde_json::to_string(&role).expect("serialize");
        let back: Role = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(role, back);
    }
}
