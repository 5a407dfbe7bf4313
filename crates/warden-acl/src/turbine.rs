//! Evaluator for the turbine model (ternary user×group×role).
//!
//! Turbine scopes every role grant to a group, with a distinguished
//! **global group** sentinel for grants not tied to any specific
//! group. At construction the role→permission hop is flattened per
//! group, so both roles and permissions are keyed directly by group.
//! The no-group query overloads (`has_role`, `has_permission`,
//! `global_roles`, `global_permissions`) consult the global scope.

use std::collections::BTreeMap;
use warden_types::{EntityId, Group, GroupSet, Permission, PermissionSet, Role, RoleSet, SecurityEntity};

/// Per-user snapshot evaluator for the turbine model.
///
/// Built from one entry per user/group/role relation, with the role's
/// permissions pre-resolved, plus the global group sentinel.
#[derive(Debug, Clone)]
pub struct TurbineAccessControlList {
    /// Roles held per group, keyed by group id.
    roles_by_group: BTreeMap<EntityId, RoleSet>,
    /// Permissions (flattened from roles) per group, keyed by group id.
    permissions_by_group: BTreeMap<EntityId, PermissionSet>,
    /// Distinct groups the user has relations in.
    groups: GroupSet,
    /// Union of roles across all groups.
    roles: RoleSet,
    /// Union of permissions across all groups.
    permissions: PermissionSet,
    /// The sentinel group for unscoped grants.
    global_group: Group,
}

impl TurbineAccessControlList {
    /// Builds the evaluator from the user's ternary relations.
    ///
    /// Each entry is one user/group/role relation together with the
    /// permissions that role carries.
    #[must_use]
    pub fn new(
        entries: impl IntoIterator<Item = (Group, Role, PermissionSet)>,
        global_group: Group,
    ) -> Self {
        let mut acl = Self {
            roles_by_group: BTreeMap::new(),
            permissions_by_group: BTreeMap::new(),
            groups: GroupSet::new(),
            roles: RoleSet::new(),
            permissions: PermissionSet::new(),
            global_group,
        };

        for (group, role, permission_set) in entries {
            let Some(group_id) = group.id() else { continue };
            acl.groups.add(group.clone());
            acl.roles.add(role.clone());
            acl.permissions.add_all(&permission_set);
            acl.roles_by_group.entry(group_id).or_default().add(role);
            acl.permissions_by_group
                .entry(group_id)
                .or_default()
                .add_all(&permission_set);
        }

        acl
    }

    /// The global group sentinel this ACL was built with.
    #[must_use]
    pub fn global_group(&self) -> &Group {
        &self.global_group
    }

    /// Distinct groups the user has role grants in.
    #[must_use]
    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Union of the user's roles over every group scope.
    #[must_use]
    pub fn all_roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Union of the user's permissions over every group scope.
    #[must_use]
    pub fn all_permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Roles the user holds within one group.
    pub fn roles_in(&self, group: &Group) -> Option<&RoleSet> {
        self.roles_by_group.get(&group.id()?)
    }

    /// Roles granted in the global (unscoped) group.
    pub fn global_roles(&self) -> Option<&RoleSet> {
        self.roles_in(&self.global_group)
    }

    /// Permissions the user holds within one group.
    pub fn permissions_in(&self, group: &Group) -> Option<&PermissionSet> {
        self.permissions_by_group.get(&group.id()?)
    }

    /// Permissions granted in the global (unscoped) group.
    pub fn global_permissions(&self) -> Option<&PermissionSet> {
        self.permissions_in(&self.global_group)
    }

    /// `true` if the user holds this role in the **global** group.
    ///
    /// This is the no-group overload: grants scoped to the global
    /// sentinel are visible here regardless of any other group
    /// scoping.
    pub fn has_role(&self, role: &Role) -> bool {
        self.has_role_in(role, &self.global_group)
    }

    /// `true` if the user holds this role within the given group.
    pub fn has_role_in(&self, role: &Role, group: &Group) -> bool {
        self.roles_in(group).is_some_and(|set| set.contains(role))
    }

    /// `true` if the user holds this role in any of the given groups.
    pub fn has_role_in_any(&self, role: &Role, groups: &GroupSet) -> bool {
        groups.iter().any(|group| self.has_role_in(role, group))
    }

    /// Name-based global role check (case-insensitive).
    pub fn has_role_name(&self, role: &str) -> bool {
        match self.roles.get_by_name(role) {
            Some(role) => self.has_role(&role.clone()),
            None => false,
        }
    }

    /// Name-based role check scoped to a named group.
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

    /// `true` if the user holds this permission in the global group.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.has_permission_in(permission, &self.global_group)
    }

    /// `true` if the user holds this permission within the given
    /// group.
    pub fn has_permission_in(&self, permission: &Permission, group: &Group) -> bool {
        self.permissions_in(group)
            .is_some_and(|set| set.contains(permission))
    }

    /// `true` if the user holds this permission in any of the given
    /// groups.
    pub fn has_permission_in_any(&self, permission: &Permission, groups: &GroupSet) -> bool {
        groups
            .iter()
            .any(|group| self.has_permission_in(permission, group))
    }

    /// Name-based global permission check.
    pub fn has_permission_name(&self, permission: &str) -> bool {
        match self.permissions.get_by_name(permission) {
            Some(p) => self.has_permission(&p.clone()),
            None => false,
        }
    }

    /// Name-based permission check scoped to a named group.
    pub fn has_permission_name_in(&self, permission: &str, group: &str) -> bool {
        self.groups
            .get_by_name(group)
            .and_then(|g| self.permissions_in(g))
            .is_some_and(|set| set.contains_name(permission))
    }

    /// Name-based permission check against a set of groups.
    pub fn has_permission_name_in_any(&self, permission: &str, groups: &GroupSet) -> bool {
        match self.permissions.get_by_name(permission) {
            Some(p) => self.has_permission_in_any(&p.clone(), groups),
            None => false,
        }
    }
}
