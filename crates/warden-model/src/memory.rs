//! In-memory backing store.
//!
//! [`MemoryStore`] keeps the whole authorization graph, entity tables
//! and every relation edge alike, behind one `parking_lot::RwLock`. Each
//! public operation acquires the lock exactly once, so a
//! check-then-mutate sequence (verify both endpoints exist, then
//! update both sides of the edge) is atomic with respect to every
//! other store operation. That closes the interleaving window the
//! grant/revoke contract worries about without asking callers for
//! external synchronization.
//!
//! The store is an injected object: create one, wrap it in an `Arc`,
//! hand it to the managers. There is no process-wide shared state and
//! two stores never interact.
//!
//! # Graph Layout
//!
//! ```text
//! entity tables   users / groups / roles / permissions (id → row)
//!
//! edge tables     user_groups      ↔ group_users      (basic, dynamic)
//! (symmetric      group_roles      ↔ role_groups      (dynamic)
//!  pairs)         role_permissions ↔ permission_roles (dynamic, turbine)
//!                 delegatees       ↔ delegators       (dynamic)
//!
//! relation arena  relations (relation id → UserGroupRole record)
//! (turbine)       indexed by_user / by_group / by_role
//! ```
//!
//! The ternary user/group/role relation is a single arena record
//! referenced from three index maps: there is exactly one copy of
//! each relation, so the three sides can never disagree.

use crate::provider::EntityStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use warden_types::{
    EntityId, EntityKind, Group, GroupSet, IdSequence, Permission, PermissionSet, Role, RoleSet,
    SecurityEntity, SecurityError, SecuritySet, User, UserSet,
};

/// Forward or backward half of a symmetric many-to-many edge.
type EdgeMap = BTreeMap<EntityId, BTreeSet<EntityId>>;

/// Arena key of a ternary relation record.
type RelationId = u64;

/// One turbine-model ternary relation: this user holds this role,
/// scoped to this group.
///
/// Stored once in the store's relation arena and referenced from the
/// by-user, by-group and by-role indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupRole {
    user: EntityId,
    group: EntityId,
    role: EntityId,
}

impl UserGroupRole {
    /// The user side of the relation.
    #[must_use]
    pub fn user(&self) -> EntityId {
        self.user
    }

    /// The group the grant is scoped to.
    #[must_use]
    pub fn group(&self) -> EntityId {
        self.group
    }

    /// The granted role.
    #[must_use]
    pub fn role(&self) -> EntityId {
        self.role
    }
}

#[derive(Debug)]
struct EntityTable<T> {
    rows: BTreeMap<EntityId, T>,
    seq: IdSequence,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            seq: IdSequence::new(),
        }
    }
}

impl<T: SecurityEntity + Clone> EntityTable<T> {
    fn persist_new(&mut self, entity: T) -> T {
        let id = self.seq.next_id();
        let entity = entity.into_persisted(id);
        self.rows.insert(id, entity.clone());
        entity
    }

    fn find_by_name(&self, name: &str) -> Option<&T> {
        let name = name.to_lowercase();
        self.rows.values().find(|e| e.name() == name)
    }

    /// The id of a row this entity actually occupies, or
    /// `UnknownEntity` naming it.
    fn require(&self, entity: &T) -> Result<EntityId, SecurityError> {
        match entity.id() {
            Some(id) if self.rows.contains_key(&id) => Ok(id),
            _ => Err(SecurityError::unknown(T::KIND, entity.name())),
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: EntityTable<User>,
    groups: EntityTable<Group>,
    roles: EntityTable<Role>,
    permissions: EntityTable<Permission>,

    user_groups: EdgeMap,
    group_users: EdgeMap,
    group_roles: EdgeMap,
    role_groups: EdgeMap,
    role_permissions: EdgeMap,
    permission_roles: EdgeMap,
    delegatees: EdgeMap,
    delegators: EdgeMap,

    next_relation: RelationId,
    relations: BTreeMap<RelationId, UserGroupRole>,
    relations_by_user: BTreeMap<EntityId, BTreeSet<RelationId>>,
    relations_by_group: BTreeMap<EntityId, BTreeSet<RelationId>>,
    relations_by_role: BTreeMap<EntityId, BTreeSet<RelationId>>,
}

/// Inserts the edge `from → to` into both halves of a symmetric pair.
/// Returns whether the edge is new.
fn link(fwd: &mut EdgeMap, bwd: &mut EdgeMap, from: EntityId, to: EntityId) -> bool {
    let inserted = fwd.entry(from).or_default().insert(to);
    if inserted {
        bwd.entry(to).or_default().insert(from);
    }
    inserted
}

/// Removes the edge `from → to` from both halves. Returns whether the
/// edge existed.
fn unlink(fwd: &mut EdgeMap, bwd: &mut EdgeMap, from: EntityId, to: EntityId) -> bool {
    let removed = fwd.get_mut(&from).is_some_and(|set| set.remove(&to));
    if removed {
        if fwd.get(&from).is_some_and(BTreeSet::is_empty) {
            fwd.remove(&from);
        }
        if let Some(set) = bwd.get_mut(&to) {
            set.remove(&from);
            if set.is_empty() {
                bwd.remove(&to);
            }
        }
    }
    removed
}

/// Removes every edge incident to `id` from a symmetric pair.
/// Returns how many edges were detached.
fn detach(fwd: &mut EdgeMap, bwd: &mut EdgeMap, id: EntityId) -> usize {
    let Some(peers) = fwd.remove(&id) else {
        return 0;
    };
    let count = peers.len();
    for peer in peers {
        if let Some(set) = bwd.get_mut(&peer) {
            set.remove(&id);
            if set.is_empty() {
                bwd.remove(&peer);
            }
        }
    }
    count
}

impl Tables {
    fn peers(&self, edges: &EdgeMap, id: EntityId) -> BTreeSet<EntityId> {
        edges.get(&id).cloned().unwrap_or_default()
    }

    fn resolve<T: SecurityEntity + Clone>(
        table: &EntityTable<T>,
        ids: &BTreeSet<EntityId>,
    ) -> SecuritySet<T> {
        ids.iter()
            .filter_map(|id| table.rows.get(id))
            .cloned()
            .collect()
    }

    /// Users reachable from `root` over delegatee edges, `root`
    /// included. The visited set bounds the walk, so delegation
    /// cycles (including self-delegation) terminate.
    fn delegatee_closure(&self, root: EntityId) -> BTreeSet<EntityId> {
        let mut visited = BTreeSet::from([root]);
        let mut stack = vec![root];
        while let Some(user) = stack.pop() {
            if let Some(delegatees) = self.delegatees.get(&user) {
                for &next in delegatees {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        visited
    }

    fn find_relation(
        &self,
        user: EntityId,
        group: EntityId,
        role: EntityId,
    ) -> Option<RelationId> {
        self.relations_by_user.get(&user).and_then(|ids| {
            ids.iter()
                .copied()
                .find(|id| {
                    self.relations
                        .get(id)
                        .is_some_and(|r| r.group == group && r.role == role)
                })
        })
    }

    fn insert_relation(&mut self, user: EntityId, group: EntityId, role: EntityId) -> bool {
        if self.find_relation(user, group, role).is_some() {
            return false;
        }
        let id = self.next_relation;
        self.next_relation += 1;
        self.relations.insert(id, UserGroupRole { user, group, role });
        self.relations_by_user.entry(user).or_default().insert(id);
        self.relations_by_group.entry(group).or_default().insert(id);
        self.relations_by_role.entry(role).or_default().insert(id);
        true
    }

    fn remove_relation(&mut self, id: RelationId) {
        if let Some(rel) = self.relations.remove(&id) {
            for (index, key) in [
                (&mut self.relations_by_user, rel.user),
                (&mut self.relations_by_group, rel.group),
                (&mut self.relations_by_role, rel.role),
            ] {
                if let Some(set) = index.get_mut(&key) {
                    set.remove(&id);
                    if set.is_empty() {
                        index.remove(&key);
                    }
                }
            }
        }
    }

    fn clear_relations(&mut self, index_of: fn(&UserGroupRole) -> EntityId, key: EntityId) -> usize {
        let ids: Vec<RelationId> = self
            .relations
            .iter()
            .filter(|(_, rel)| index_of(rel) == key)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.remove_relation(*id);
        }
        ids.len()
    }
}

/// Thread-safe in-memory authorization graph.
///
/// Mostly meant for testing, prototyping and as the reference
/// implementation of the storage contract; durable backends implement
/// [`EntityStore`] in their own crates and pair it with their own
/// model managers.
///
/// # Example
///
/// ```
/// use warden_model::{EntityStore, MemoryStore};
/// use warden_types::{SecurityEntity, User};
///
/// let store = MemoryStore::new();
/// let alice = store.persist_new(User::new("alice")).expect("persist");
/// assert!(alice.id().is_some());
/// assert!(EntityStore::<User>::exists_by_name(&store, "ALICE").expect("probe"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- membership edges (basic + dynamic models) ----

    /// Adds `user` to `group`, updating both sides. `Ok(false)` if the
    /// membership already existed.
    pub fn link_membership(&self, user: &User, group: &Group) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        let gid = t.groups.require(group)?;
        Ok(link(&mut t.user_groups, &mut t.group_users, uid, gid))
    }

    /// Removes `user` from `group`. `Ok(false)` if there was no such
    /// membership (idempotent).
    pub fn unlink_membership(&self, user: &User, group: &Group) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        let gid = t.groups.require(group)?;
        Ok(unlink(&mut t.user_groups, &mut t.group_users, uid, gid))
    }

    /// The groups a user belongs to.
    pub fn groups_of_user(&self, user: &User) -> Result<GroupSet, SecurityError> {
        let t = self.inner.read();
        let uid = t.users.require(user)?;
        Ok(Tables::resolve(&t.groups, &t.peers(&t.user_groups, uid)))
    }

    /// The users belonging to a group.
    pub fn users_in_group(&self, group: &Group) -> Result<UserSet, SecurityError> {
        let t = self.inner.read();
        let gid = t.groups.require(group)?;
        Ok(Tables::resolve(&t.users, &t.peers(&t.group_users, gid)))
    }

    /// Detaches every membership edge incident to `user`. Returns the
    /// number of memberships removed.
    pub fn clear_user_memberships(&self, user: &User) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        Ok(detach(&mut t.user_groups, &mut t.group_users, uid))
    }

    /// Detaches every membership edge incident to `group`.
    pub fn clear_group_memberships(&self, group: &Group) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let gid = t.groups.require(group)?;
        Ok(detach(&mut t.group_users, &mut t.user_groups, gid))
    }

    // ---- group↔role edges (dynamic model) ----

    /// Grants `role` to `group`, both sides. `Ok(false)` if already
    /// granted.
    pub fn link_group_role(&self, group: &Group, role: &Role) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let gid = t.groups.require(group)?;
        let rid = t.roles.require(role)?;
        Ok(link(&mut t.group_roles, &mut t.role_groups, gid, rid))
    }

    /// Revokes `role` from `group`. Idempotent.
    pub fn unlink_group_role(&self, group: &Group, role: &Role) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let gid = t.groups.require(group)?;
        let rid = t.roles.require(role)?;
        Ok(unlink(&mut t.group_roles, &mut t.role_groups, gid, rid))
    }

    /// The roles a group holds.
    pub fn roles_of_group(&self, group: &Group) -> Result<RoleSet, SecurityError> {
        let t = self.inner.read();
        let gid = t.groups.require(group)?;
        Ok(Tables::resolve(&t.roles, &t.peers(&t.group_roles, gid)))
    }

    /// The groups holding a role.
    pub fn groups_of_role(&self, role: &Role) -> Result<GroupSet, SecurityError> {
        let t = self.inner.read();
        let rid = t.roles.require(role)?;
        Ok(Tables::resolve(&t.groups, &t.peers(&t.role_groups, rid)))
    }

    /// Detaches every group↔role edge incident to `group`.
    pub fn clear_group_roles(&self, group: &Group) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let gid = t.groups.require(group)?;
        Ok(detach(&mut t.group_roles, &mut t.role_groups, gid))
    }

    /// Detaches every group↔role edge incident to `role`.
    pub fn clear_role_groups(&self, role: &Role) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let rid = t.roles.require(role)?;
        Ok(detach(&mut t.role_groups, &mut t.group_roles, rid))
    }

    // ---- role↔permission edges (dynamic + turbine models) ----

    /// Grants `permission` to `role`, both sides. `Ok(false)` if
    /// already granted.
    pub fn link_role_permission(
        &self,
        role: &Role,
        permission: &Permission,
    ) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let rid = t.roles.require(role)?;
        let pid = t.permissions.require(permission)?;
        Ok(link(&mut t.role_permissions, &mut t.permission_roles, rid, pid))
    }

    /// Revokes `permission` from `role`. Idempotent.
    pub fn unlink_role_permission(
        &self,
        role: &Role,
        permission: &Permission,
    ) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let rid = t.roles.require(role)?;
        let pid = t.permissions.require(permission)?;
        Ok(unlink(&mut t.role_permissions, &mut t.permission_roles, rid, pid))
    }

    /// The permissions a role carries.
    pub fn permissions_of_role(&self, role: &Role) -> Result<PermissionSet, SecurityError> {
        let t = self.inner.read();
        let rid = t.roles.require(role)?;
        Ok(Tables::resolve(
            &t.permissions,
            &t.peers(&t.role_permissions, rid),
        ))
    }

    /// The roles carrying a permission.
    pub fn roles_of_permission(&self, permission: &Permission) -> Result<RoleSet, SecurityError> {
        let t = self.inner.read();
        let pid = t.permissions.require(permission)?;
        Ok(Tables::resolve(&t.roles, &t.peers(&t.permission_roles, pid)))
    }

    /// Detaches every role↔permission edge incident to `role`.
    pub fn clear_role_permissions(&self, role: &Role) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let rid = t.roles.require(role)?;
        Ok(detach(&mut t.role_permissions, &mut t.permission_roles, rid))
    }

    /// Detaches every role↔permission edge incident to `permission`.
    pub fn clear_permission_roles(&self, permission: &Permission) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let pid = t.permissions.require(permission)?;
        Ok(detach(&mut t.permission_roles, &mut t.role_permissions, pid))
    }

    // ---- delegation edges (dynamic model) ----

    /// Records that `delegator` delegates to `delegatee`, both sides.
    /// Calling twice is not an error; `Ok(false)` marks the repeat.
    /// Self-delegation and cycles are permitted; closure traversal is
    /// visited-set bounded.
    pub fn link_delegation(&self, delegator: &User, delegatee: &User) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let from = t.users.require(delegator)?;
        let to = t.users.require(delegatee)?;
        Ok(link(&mut t.delegatees, &mut t.delegators, from, to))
    }

    /// Removes a delegation. Unlike the plain edges, removing a
    /// delegation that does not exist is an `UnknownEntity` error.
    pub fn unlink_delegation(&self, delegator: &User, delegatee: &User) -> Result<(), SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let from = t.users.require(delegator)?;
        let to = t.users.require(delegatee)?;
        if unlink(&mut t.delegatees, &mut t.delegators, from, to) {
            Ok(())
        } else {
            Err(SecurityError::unknown(
                EntityKind::User,
                format!("{} (no such delegation from {})", delegatee.name(), delegator.name()),
            ))
        }
    }

    /// The users this user delegates to.
    pub fn delegatees_of(&self, user: &User) -> Result<UserSet, SecurityError> {
        let t = self.inner.read();
        let uid = t.users.require(user)?;
        Ok(Tables::resolve(&t.users, &t.peers(&t.delegatees, uid)))
    }

    /// The users delegating to this user.
    pub fn delegators_of(&self, user: &User) -> Result<UserSet, SecurityError> {
        let t = self.inner.read();
        let uid = t.users.require(user)?;
        Ok(Tables::resolve(&t.users, &t.peers(&t.delegators, uid)))
    }

    /// Detaches every delegation edge incident to `user`, in both
    /// directions.
    pub fn clear_delegations(&self, user: &User) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        Ok(detach(&mut t.delegatees, &mut t.delegators, uid)
            + detach(&mut t.delegators, &mut t.delegatees, uid))
    }

    /// Resolves the dynamic-model snapshot for one user under a single
    /// lock acquisition: the roles per group and permissions per role
    /// of every user in the delegatee closure.
    #[allow(clippy::type_complexity)]
    pub fn dynamic_snapshot(
        &self,
        user: &User,
    ) -> Result<(Vec<(Group, RoleSet)>, Vec<(Role, PermissionSet)>), SecurityError> {
        let t = self.inner.read();
        let uid = t.users.require(user)?;

        let mut roles_by_group: BTreeMap<EntityId, (Group, RoleSet)> = BTreeMap::new();
        let mut permissions_by_role: BTreeMap<EntityId, (Role, PermissionSet)> = BTreeMap::new();

        for member in t.delegatee_closure(uid) {
            for gid in t.peers(&t.user_groups, member) {
                let Some(group) = t.groups.rows.get(&gid) else {
                    continue;
                };
                let role_ids = t.peers(&t.group_roles, gid);
                let role_set = Tables::resolve(&t.roles, &role_ids);
                for rid in role_ids {
                    let Some(role) = t.roles.rows.get(&rid) else {
                        continue;
                    };
                    let permissions =
                        Tables::resolve(&t.permissions, &t.peers(&t.role_permissions, rid));
                    permissions_by_role.insert(rid, (role.clone(), permissions));
                }
                roles_by_group.insert(gid, (group.clone(), role_set));
            }
        }

        Ok((
            roles_by_group.into_values().collect(),
            permissions_by_role.into_values().collect(),
        ))
    }

    // ---- ternary relations (turbine model) ----

    /// Creates the user/group/role relation, registering the single
    /// record in all three indexes. `Ok(false)` if the relation
    /// already existed.
    pub fn link_relation(
        &self,
        user: &User,
        group: &Group,
        role: &Role,
    ) -> Result<bool, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        let gid = t.groups.require(group)?;
        let rid = t.roles.require(role)?;
        Ok(t.insert_relation(uid, gid, rid))
    }

    /// Removes the user/group/role relation from the arena and all
    /// three indexes. Removing a relation that does not exist is an
    /// `UnknownEntity` error.
    pub fn unlink_relation(
        &self,
        user: &User,
        group: &Group,
        role: &Role,
    ) -> Result<(), SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        let gid = t.groups.require(group)?;
        let rid = t.roles.require(role)?;
        match t.find_relation(uid, gid, rid) {
            Some(id) => {
                t.remove_relation(id);
                Ok(())
            }
            None => Err(SecurityError::unknown(
                EntityKind::Role,
                format!(
                    "{} (no relation for user '{}' in group '{}')",
                    role.name(),
                    user.name(),
                    group.name()
                ),
            )),
        }
    }

    /// The ternary relations this user participates in.
    pub fn relations_of_user(&self, user: &User) -> Result<Vec<UserGroupRole>, SecurityError> {
        let t = self.inner.read();
        let uid = t.users.require(user)?;
        Ok(t.relations_by_user
            .get(&uid)
            .into_iter()
            .flatten()
            .filter_map(|id| t.relations.get(id))
            .copied()
            .collect())
    }

    /// For every relation the user holds with `old_role`, creates the
    /// equivalent relation with `new_role` (same group scope) and
    /// removes the original, atomically under one lock. Returns how
    /// many relations were rewritten. Replacing a role with itself
    /// leaves the graph unchanged.
    pub fn replace_role(
        &self,
        user: &User,
        old_role: &Role,
        new_role: &Role,
    ) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        let old = t.roles.require(old_role)?;
        let new = t.roles.require(new_role)?;
        if old == new {
            return Ok(0);
        }

        let targets: Vec<(RelationId, EntityId)> = t
            .relations_by_user
            .get(&uid)
            .into_iter()
            .flatten()
            .filter_map(|id| {
                let rel = t.relations.get(id)?;
                (rel.role == old).then_some((*id, rel.group))
            })
            .collect();

        for (id, group) in &targets {
            t.insert_relation(uid, *group, new);
            t.remove_relation(*id);
        }
        Ok(targets.len())
    }

    /// Removes every ternary relation the user participates in.
    pub fn clear_relations_of_user(&self, user: &User) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let uid = t.users.require(user)?;
        Ok(t.clear_relations(|rel| rel.user, uid))
    }

    /// Removes every ternary relation scoped to the group.
    pub fn clear_relations_of_group(&self, group: &Group) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let gid = t.groups.require(group)?;
        Ok(t.clear_relations(|rel| rel.group, gid))
    }

    /// Removes every ternary relation granting the role.
    pub fn clear_relations_of_role(&self, role: &Role) -> Result<usize, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        let rid = t.roles.require(role)?;
        Ok(t.clear_relations(|rel| rel.role, rid))
    }

    /// Resolves the turbine-model snapshot for one user under a single
    /// lock acquisition: one `(group, role, role's permissions)` entry
    /// per ternary relation.
    pub fn turbine_snapshot(
        &self,
        user: &User,
    ) -> Result<Vec<(Group, Role, PermissionSet)>, SecurityError> {
        let t = self.inner.read();
        let uid = t.users.require(user)?;
        let mut entries = Vec::new();
        for id in t.relations_by_user.get(&uid).into_iter().flatten() {
            let Some(rel) = t.relations.get(id) else {
                continue;
            };
            let (Some(group), Some(role)) =
                (t.groups.rows.get(&rel.group), t.roles.rows.get(&rel.role))
            else {
                continue;
            };
            let permissions =
                Tables::resolve(&t.permissions, &t.peers(&t.role_permissions, rel.role));
            entries.push((group.clone(), role.clone(), permissions));
        }
        Ok(entries)
    }

    /// Returns the group with this name, creating and persisting it if
    /// absent, in one critical section so concurrent callers observe
    /// a single instance. Used for the turbine global group sentinel.
    pub fn fetch_or_create_group(&self, name: &str) -> Result<Group, SecurityError> {
        let mut guard = self.inner.write();
        let t = &mut *guard;
        if let Some(group) = t.groups.find_by_name(name) {
            return Ok(group.clone());
        }
        Ok(t.groups.persist_new(Group::new(name)))
    }
}

macro_rules! entity_store_impl {
    ($ty:ty, $table:ident) => {
        impl EntityStore<$ty> for MemoryStore {
            fn persist_new(&self, entity: $ty) -> Result<$ty, SecurityError> {
                Ok(self.inner.write().$table.persist_new(entity))
            }

            fn exists_by_name(&self, name: &str) -> Result<bool, SecurityError> {
                Ok(self.inner.read().$table.find_by_name(name).is_some())
            }

            fn all(&self) -> Result<SecuritySet<$ty>, SecurityError> {
                Ok(self.inner.read().$table.rows.values().cloned().collect())
            }

            fn by_id(&self, id: EntityId) -> Result<$ty, SecurityError> {
                self.inner
                    .read()
                    .$table
                    .rows
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| {
                        SecurityError::unknown(<$ty as SecurityEntity>::KIND, id.to_string())
                    })
            }

            fn by_name(&self, name: &str) -> Result<$ty, SecurityError> {
                self.inner
                    .read()
                    .$table
                    .find_by_name(name)
                    .cloned()
                    .ok_or_else(|| SecurityError::unknown(<$ty as SecurityEntity>::KIND, name))
            }

            fn update(&self, entity: &$ty) -> Result<(), SecurityError> {
                let mut guard = self.inner.write();
                let id = guard.$table.require(entity)?;
                guard.$table.rows.insert(id, entity.clone());
                Ok(())
            }

            fn delete(&self, id: EntityId) -> Result<(), SecurityError> {
                match self.inner.write().$table.rows.remove(&id) {
                    Some(_) => Ok(()),
                    None => Err(SecurityError::unknown(
                        <$ty as SecurityEntity>::KIND,
                        id.to_string(),
                    )),
                }
            }
        }
    };
}

entity_store_impl!(User, users);
entity_store_impl!(Group, groups);
entity_store_impl!(Role, roles);
entity_store_impl!(Permission, permissions);
