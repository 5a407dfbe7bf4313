//! Identity-unique, name-searchable entity collections.
//!
//! [`SecuritySet`] is the container underlying every entity collection
//! in the framework: the set of all known groups, the groups a user
//! belongs to, the roles a group holds, a query result handed to an
//! ACL evaluator. It enforces uniqueness by id, answers name lookups
//! case-insensitively, and iterates in ascending id order so that
//! traversals are reproducible.
//!
//! # Keying Quirk (deliberate)
//!
//! Storage and [`add`](SecuritySet::add) are keyed by **id**, while
//! [`contains`](SecuritySet::contains) and the boolean result of
//! [`remove`](SecuritySet::remove) are keyed by **name**. Two entities
//! with the same name but different ids can therefore coexist in the
//! id map while `contains` reports either as present. Manager code
//! (`check_exists` and friends) depends on the name-based answer, so
//! this mismatch is a preserved invariant, not a bug; the tests in
//! this module pin it down.

use crate::{EntityId, SecurityEntity};
use std::collections::BTreeMap;
use std::fmt;

/// A set of [`User`](crate::User)s.
pub type UserSet = SecuritySet<crate::User>;
/// A set of [`Group`](crate::Group)s.
pub type GroupSet = SecuritySet<crate::Group>;
/// A set of [`Role`](crate::Role)s.
pub type RoleSet = SecuritySet<crate::Role>;
/// A set of [`Permission`](crate::Permission)s.
pub type PermissionSet = SecuritySet<crate::Permission>;

/// Uniqueness-enforcing collection of security entities.
///
/// Backed by an ordered id map plus a lowercased name index. Only
/// persisted entities (id assigned) can be members; adding an
/// unpersisted entity is a no-op returning `false`.
///
/// # Example
///
/// ```
/// use warden_types::{EntityId, GroupSet, Group, SecurityEntity};
///
/// let mut set = GroupSet::new();
/// let g = Group::new("Front_Desk").into_persisted(EntityId::from_raw(1));
/// assert!(set.add(g.clone()));
/// assert!(!set.add(g.clone())); // same id: no-op
/// assert!(set.get_by_name("FRONT_DESK").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SecuritySet<T> {
    by_id: BTreeMap<EntityId, T>,
    /// Lowercased name -> id of the most recently added bearer.
    name_index: BTreeMap<String, EntityId>,
}

impl<T: SecurityEntity> SecuritySet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: BTreeMap::new(),
            name_index: BTreeMap::new(),
        }
    }

    /// Inserts an entity, keyed by id.
    ///
    /// Returns `false` without mutating when a member with the same id
    /// is already present (the "already a member" probe used by the
    /// managers) or when the entity has no id yet. A same-named entity
    /// under a different id does not block the insert; it merely loses
    /// its name-index slot to the newcomer.
    pub fn add(&mut self, entity: T) -> bool {
        let Some(id) = entity.id() else {
            return false;
        };
        if self.by_id.contains_key(&id) {
            return false;
        }
        self.name_index.insert(entity.name().to_string(), id);
        self.by_id.insert(id, entity);
        true
    }

    /// Membership probe, keyed by **name** (see module docs).
    pub fn contains(&self, entity: &T) -> bool {
        self.contains_name(entity.name())
    }

    /// `true` if a member carries this name (case-insensitive).
    pub fn contains_name(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.name_index.contains_key(&name.to_lowercase())
    }

    /// `true` if a member carries this id.
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Looks up a member by name, case-insensitively.
    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.name_index
            .get(&name.to_lowercase())
            .and_then(|id| self.by_id.get(id))
    }

    /// Looks up a member by id.
    pub fn get_by_id(&self, id: EntityId) -> Option<&T> {
        self.by_id.get(&id)
    }

    /// Removes the member with this entity's id.
    ///
    /// Returns whether a **same-named** member existed beforehand
    /// (name-keyed, mirroring [`contains`](Self::contains)). The name
    /// index entry for the entity's name is dropped unconditionally.
    pub fn remove(&mut self, entity: &T) -> bool {
        let had_name = self.contains_name(entity.name());
        if let Some(id) = entity.id() {
            self.by_id.remove(&id);
        }
        self.name_index.remove(entity.name());
        had_name
    }

    /// Union: adds every member of `other` (by value, cloning).
    ///
    /// Returns `true` if this set changed.
    pub fn add_all(&mut self, other: &Self) -> bool
    where
        T: Clone,
    {
        let mut changed = false;
        for entity in other.iter() {
            changed |= self.add(entity.clone());
        }
        changed
    }

    /// Subtraction: removes every member of `other`.
    ///
    /// Returns `true` if this set changed.
    pub fn remove_all(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for entity in other.iter() {
            changed |= self.remove(entity);
        }
        changed
    }

    /// Set intersection removal. Always fails.
    ///
    /// The authorization domain never intersects entity sets in place;
    /// an accidental caller finds out loudly instead of silently
    /// keeping a set the domain never produces.
    pub fn retain_all(&mut self, _other: &Self) -> Result<bool, crate::SecurityError> {
        Err(crate::SecurityError::UnsupportedOperation {
            operation: "SecuritySet::retain_all",
        })
    }

    /// Member names, in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_id.values().map(SecurityEntity::name)
    }

    /// Member ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.by_id.keys().copied()
    }

    /// Iterates members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.by_id.values()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// `true` when the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Removes all members.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.name_index.clear();
    }
}

impl<T: SecurityEntity> Default for SecuritySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SecurityEntity> FromIterator<T> for SecuritySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for entity in iter {
            set.add(entity);
        }
        set
    }
}

impl<T: SecurityEntity> Extend<T> for SecuritySet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entity in iter {
            self.add(entity);
        }
    }
}

impl<T: SecurityEntity> IntoIterator for SecuritySet<T> {
    type Item = T;
    type IntoIter = std::collections::btree_map::IntoValues<EntityId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_id.into_values()
    }
}

impl<'a, T: SecurityEntity> IntoIterator for &'a SecuritySet<T> {
    type Item = &'a T;
    type IntoIter = std::collections::btree_map::Values<'a, EntityId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_id.values()
    }
}

impl<T: SecurityEntity> fmt::Display for SecuritySet<T> {
    /// `[name -> id]` pairs in id order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (id, entity) in &self.by_id {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "[{} -> {}]", entity.name(), id)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, User};

    fn role(name: &str, id: u64) -> Role {
        Role::new(name).into_persisted(EntityId::from_raw(id))
    }

    #[test]
    fn second_add_with_same_id_is_a_noop() {
        let mut set = RoleSet::new();
        assert!(set.add(role("admin", 1)));
        assert!(!set.add(role("other_name", 1)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_by_id(EntityId::from_raw(1)).map(Role::name), Some("admin"));
    }

    #[test]
    fn unpersisted_entity_is_rejected() {
        let mut set = RoleSet::new();
        assert!(!set.add(Role::new("floating")));
        assert!(set.is_empty());
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let mut set = UserSet::new();
        set.add(User::new("Bob").into_persisted(EntityId::from_raw(1)));
        assert!(set.get_by_name("BOB").is_some());
        assert!(set.get_by_name("bob").is_some());
        assert!(std::ptr::eq(
            set.get_by_name("BOB").expect("bob"),
            set.get_by_name("bob").expect("bob"),
        ));
    }

    #[test]
    fn contains_is_name_keyed_not_id_keyed() {
        let mut set = RoleSet::new();
        set.add(role("editor", 1));

        // Different id, same name: "contained" as far as contains() goes.
        let impostor = role("editor", 99);
        assert!(set.contains(&impostor));
        assert!(!set.contains_id(EntityId::from_raw(99)));
    }

    #[test]
    fn same_name_different_id_coexist_in_id_map() {
        let mut set = RoleSet::new();
        assert!(set.add(role("editor", 1)));
        assert!(set.add(role("editor", 2)));
        assert_eq!(set.len(), 2);
        // Name index points at the most recent bearer.
        assert_eq!(
            set.get_by_name("editor").and_then(Role::id),
            Some(EntityId::from_raw(2))
        );
    }

    #[test]
    fn remove_reports_name_presence_and_drops_by_id() {
        let mut set = RoleSet::new();
        set.add(role("editor", 1));

        let absent = role("viewer", 2);
        assert!(!set.remove(&absent));

        let member = role("editor", 1);
        assert!(set.remove(&member));
        assert!(set.is_empty());
        assert!(!set.contains_name("editor"));
    }

    #[test]
    fn iteration_is_id_ordered_regardless_of_insertion() {
        let mut set = RoleSet::new();
        set.add(role("c", 3));
        set.add(role("a", 1));
        set.add(role("b", 2));
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let ids: Vec<u64> = set.ids().map(EntityId::as_u64).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn add_all_and_remove_all_report_change() {
        let mut a: RoleSet = [role("r1", 1), role("r2", 2)].into_iter().collect();
        let b: RoleSet = [role("r2", 2), role("r3", 3)].into_iter().collect();

        assert!(a.add_all(&b));
        assert_eq!(a.len(), 3);
        assert!(!a.add_all(&b));

        assert!(a.remove_all(&b));
        assert_eq!(a.len(), 1);
        assert!(a.contains_name("r1"));
    }

    #[test]
    fn retain_all_always_fails() {
        let mut a = RoleSet::new();
        let b = RoleSet::new();
        assert!(a.retain_all(&b).is_err());
    }

    #[test]
    fn empty_name_probe_is_false_not_a_panic() {
        let set = RoleSet::new();
        assert!(!set.contains_name(""));
        assert!(set.get_by_name("").is_none());
    }

    #[test]
    fn display_lists_name_id_pairs() {
        let mut set = RoleSet::new();
        set.add(role("a", 1));
        set.add(role("b", 2));
        assert_eq!(set.to_string(), "[a -> 1], [b -> 2]");
    }
}
