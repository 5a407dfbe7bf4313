//! Evaluator for the dynamic model (user–group–role–permission).
//!
//! Constructed from two snapshot maps (the roles the user holds per
//! group, and the permissions each of those roles carries), and
//! answers every query without further I/O. Permission queries compose
//! the two hops (group → roles → permissions) on the fly.
//!
//! All queries are total: an unknown role, permission or group yields
//! `false` or an empty set, never an error. A "no" from this type
//! means "no permission"; it never stands in for "the system could not
//! determine your permissions" (that failure surfaces earlier, when
//! the snapshot is resolved).

use std::collections::BTreeMap;
use warden_types::{EntityId, Group, GroupSet, Permission, PermissionSet, Role, RoleSet, SecurityEntity};

/// Per-user, per-decision snapshot evaluator for the dynamic model.
///
/// # Example
///
/// ```
/// use warden_acl::DynamicAccessControlList;
/// use warden_types::{EntityId, Group, Permission, PermissionSet, Role, RoleSet, SecurityEntity};
///
/// let group = Group::new("front_desk").into_persisted(EntityId::from_raw(1));
/// let role = Role::new("receptionist").into_persisted(EntityId::from_raw(1));
/// let perm = Permission::new("answer_phone").into_persisted(EntityId::from_raw(1));
///
/// let mut roles = RoleSet::new();
/// roles.add(role.clone());
/// let mut perms = PermissionSet::new();
/// perms.add(perm.clone());
///
/// let acl = DynamicAccessControlList::new(
///     [(group.clone(), roles)],
///     [(role.clone(), perms)],
/// );
/// assert!(acl.has_role(&role));
/// assert!(acl.has_permission_in(&perm, &group));
/// assert!(!acl.has_role_name("janitor"));
/// ```
#[derive(Debug, Clone)]
pub struct DynamicAccessControlList {
    /// Roles held per group, keyed by group id.
    roles_by_group: BTreeMap<EntityId, RoleSet>,
    /// Permissions carried per role, keyed by role id.
    permissions_by_role: BTreeMap<EntityId, PermissionSet>,
    /// Distinct groups in the snapshot.
    groups: GroupSet,
    /// Union of all role sets.
    roles: RoleSet,
    /// Union of all permission sets.
    permissions: PermissionSet,
}

impl DynamicAccessControlList {
    /// Builds the evaluator from resolved snapshot maps.
    ///
    /// `roles_by_group` carries the roles the user holds in each of
    /// their groups; `permissions_by_role` the permissions of every
    /// role reachable that way. Later entries for the same group or
    /// role overwrite earlier ones.
    #[must_use]
    pub fn new(
        roles_by_group: impl IntoIterator<Item = (Group, RoleSet)>,
        permissions_by_role: impl IntoIterator<Item = (Role, PermissionSet)>,
    ) -> Self {
        let mut acl = Self {
            roles_by_group: BTreeMap::new(),
            permissions_by_role: BTreeMap::new(),
            groups: GroupSet::new(),
            roles: RoleSet::new(),
            permissions: PermissionSet::new(),
        };

        for (group, role_set) in roles_by_group {
            let Some(id) = group.id() else { continue };
            acl.roles.add_all(&role_set);
            acl.groups.add(group);
            acl.roles_by_group.insert(id, role_set);
        }
        // The role union comes from the group map alone; a permission
        // entry for a role held in no group must not make has_role
        // answer true.
        for (role, permission_set) in permissions_by_role {
            let Some(id) = role.id() else { continue };
            acl.permissions.add_all(&permission_set);
            acl.permissions_by_role.insert(id, permission_set);
        }

        acl
    }

    /// Distinct groups the user belongs to.
    #[must_use]
    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Union of the user's roles across all groups.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Roles the user holds within one group, if that group is in the
    /// snapshot.
    pub fn roles_in(&self, group: &Group) -> Option<&RoleSet> {
        self.roles_by_group.get(&group.id()?)
    }

    /// Union of the user's permissions across all roles.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Permissions reachable from one group: the union over the
    /// permission sets of every role held in that group.
    pub fn permissions_in(&self, group: &Group) -> PermissionSet {
        let mut out = PermissionSet::new();
        if let Some(roles) = self.roles_in(group) {
            for role in roles {
                if let Some(id) = role.id() {
                    if let Some(permissions) = self.permissions_by_role.get(&id) {
                        out.add_all(permissions);
                    }
                }
            }
        }
        out
    }

    /// `true` if the user holds this role in any group.
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// `true` if the user holds this role within the given group.
    pub fn has_role_in(&self, role: &Role, group: &Group) -> bool {
        self.roles_in(group).is_some_and(|set| set.contains(role))
    }

    /// `true` if the user holds this role in any of the given groups.
    pub fn has_role_in_any(&self, role: &Role, groups: &GroupSet) -> bool {
        groups.iter().any(|group| self.has_role_in(role, group))
    }

    /// Name-based role check across all groups (case-insensitive).
    pub fn has_role_name(&self, role: &str) -> bool {
        self.roles.contains_name(role)
    }

    /// Name-based role check scoped to a named group. Unknown names
    /// on either side answer `false`.
    pub fn has_role_name_in(&self, role: &str, group: &str) -> bool {
        self.groups
            .get_by_name(group)
            .and_then(|g| self.roles_in(g))
            .is_some_and(|set| set.contains_name(role))
    }

    /// Name-based role check against a set of groups.
    pub fn has_role_name_in_any(&self, role: &str, groups: &GroupSet) -> bool {
        match self.roles.get_by_name(role) {
            Some(role) => self.has_role_in_any(&role.clone(), groups),
            None => false,
        }
    }

    /// `true` if any role the user holds carries this permission.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Two-hop check: the permission must be carried by a role held
    /// within the given group.
    pub fn has_permission_in(&self, permission: &Permission, group: &Group) -> bool {
        self.permissions_in(group).contains(permission)
    }

    /// `true` if the permission is reachable within any of the given
    /// groups.
    pub fn has_permission_in_any(&self, permission: &Permission, groups: &GroupSet) -> bool {
        groups
            .iter()
            .any(|group| self.has_permission_in(permission, group))
    }

    /// Name-based permission check across all roles.
    pub fn has_permission_name(&self, permission: &str) -> bool {
        self.permissions.contains_name(permission)
    }

    /// Name-based permission check scoped to a named group.
    pub fn has_permission_name_in(&self, permission: &str, group: &str) -> bool {
        match (
            self.permissions.get_by_name(permission),
            self.groups.get_by_name(group),
        ) {
            (Some(p), Some(g)) => self.has_permission_in(&p.clone(), &g.clone()),
            _ => false,
        }
    }

    /// Name-based permission check against a set of groups.
    pub fn has_permission_name_in_any(&self, permission: &str, groups: &GroupSet) -> bool {
        match self.permissions.get_by_name(permission) {
            Some(p) => self.has_permission_in_any(&p.clone(), groups),
            None => false,
        }
    }
}
