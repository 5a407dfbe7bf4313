//! Dynamic-model manager: the full user→group→role→permission chain
//! plus delegation.

use crate::memory::MemoryStore;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_acl::DynamicAccessControlList;
use warden_types::{Group, Permission, Role, SecurityEntity, SecurityError, User, UserSet};

/// Mutation surface of the dynamic model.
///
/// Three binary relations (user↔group, group↔role, role↔permission)
/// and the delegation relation between users. [`acl_for`] folds the
/// whole chain, delegations included, into one snapshot.
///
/// [`acl_for`]: Self::acl_for
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_model::{DynamicModelManager, EntityStore, MemoryStore};
/// use warden_types::{Group, Permission, Role, User};
///
/// let store = Arc::new(MemoryStore::new());
/// let model = DynamicModelManager::new(Arc::clone(&store));
///
/// let alice = store.persist_new(User::new("alice"))?;
/// let desk = store.persist_new(Group::new("front_desk"))?;
/// let recep = store.persist_new(Role::new("receptionist"))?;
/// let phone = store.persist_new(Permission::new("answer_phone"))?;
///
/// model.grant_membership(&alice, &desk)?;
/// model.grant_role(&desk, &recep)?;
/// model.grant_permission(&recep, &phone)?;
///
/// let acl = model.acl_for(&alice)?;
/// assert!(acl.has_role(&recep));
/// assert!(acl.has_permission(&phone));
/// # Ok::<(), warden_types::SecurityError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DynamicModelManager {
    store: Arc<MemoryStore>,
}

impl DynamicModelManager {
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ---- memberships ----

    /// Adds the user to the group. Idempotent.
    pub fn grant_membership(&self, user: &User, group: &Group) -> Result<(), SecurityError> {
        self.store.link_membership(user, group)?;
        debug!(user = %user.name(), group = %group.name(), "membership granted");
        Ok(())
    }

    /// Removes the user from the group. Idempotent.
    pub fn revoke_membership(&self, user: &User, group: &Group) -> Result<(), SecurityError> {
        self.store.unlink_membership(user, group)?;
        debug!(user = %user.name(), group = %group.name(), "membership revoked");
        Ok(())
    }

    // ---- role grants ----

    /// Grants the role to the group. Idempotent.
    pub fn grant_role(&self, group: &Group, role: &Role) -> Result<(), SecurityError> {
        self.store.link_group_role(group, role)?;
        debug!(group = %group.name(), role = %role.name(), "role granted");
        Ok(())
    }

    /// Revokes the role from the group. Idempotent.
    pub fn revoke_role(&self, group: &Group, role: &Role) -> Result<(), SecurityError> {
        self.store.unlink_group_role(group, role)?;
        debug!(group = %group.name(), role = %role.name(), "role revoked");
        Ok(())
    }

    // ---- permission grants ----

    /// Grants the permission to the role. Idempotent.
    pub fn grant_permission(
        &self,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), SecurityError> {
        self.store.link_role_permission(role, permission)?;
        debug!(role = %role.name(), permission = %permission.name(), "permission granted");
        Ok(())
    }

    /// Revokes the permission from the role. Idempotent.
    pub fn revoke_permission(
        &self,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), SecurityError> {
        self.store.unlink_role_permission(role, permission)?;
        debug!(role = %role.name(), permission = %permission.name(), "permission revoked");
        Ok(())
    }

    // ---- revoke-all fan-outs ----

    /// Strips the user of every membership and every delegation edge,
    /// both directions. Run before deleting the user.
    pub fn revoke_all_user(&self, user: &User) -> Result<(), SecurityError> {
        let memberships = self.store.clear_user_memberships(user)?;
        let delegations = self.store.clear_delegations(user)?;
        warn!(user = %user.name(), memberships, delegations, "all grants revoked for user");
        Ok(())
    }

    /// Strips the group of every member and every granted role.
    pub fn revoke_all_group(&self, group: &Group) -> Result<(), SecurityError> {
        let members = self.store.clear_group_memberships(group)?;
        let roles = self.store.clear_group_roles(group)?;
        warn!(group = %group.name(), members, roles, "all grants revoked for group");
        Ok(())
    }

    /// Strips the role out of every group and drops every permission
    /// it carries.
    pub fn revoke_all_role(&self, role: &Role) -> Result<(), SecurityError> {
        let groups = self.store.clear_role_groups(role)?;
        let permissions = self.store.clear_role_permissions(role)?;
        warn!(role = %role.name(), groups, permissions, "all grants revoked for role");
        Ok(())
    }

    /// Removes the permission from every role carrying it.
    pub fn revoke_all_permission(&self, permission: &Permission) -> Result<(), SecurityError> {
        let roles = self.store.clear_permission_roles(permission)?;
        warn!(permission = %permission.name(), roles, "permission revoked from all roles");
        Ok(())
    }

    // ---- delegation ----

    /// Records that `delegator` delegates their grants to `delegatee`:
    /// from then on, snapshots built for `delegator` also fold in
    /// whatever `delegatee` (and anyone `delegatee` delegates to)
    /// holds. Idempotent; self-delegation and cycles are permitted.
    pub fn add_delegate(&self, delegator: &User, delegatee: &User) -> Result<(), SecurityError> {
        self.store.link_delegation(delegator, delegatee)?;
        debug!(delegator = %delegator.name(), delegatee = %delegatee.name(), "delegation added");
        Ok(())
    }

    /// Removes a delegation.
    ///
    /// # Errors
    ///
    /// [`SecurityError::UnknownEntity`] if no such delegation exists.
    pub fn remove_delegate(&self, delegator: &User, delegatee: &User) -> Result<(), SecurityError> {
        self.store.unlink_delegation(delegator, delegatee)?;
        debug!(delegator = %delegator.name(), delegatee = %delegatee.name(), "delegation removed");
        Ok(())
    }

    /// The users this user delegates to.
    pub fn delegatees_of(&self, user: &User) -> Result<UserSet, SecurityError> {
        self.store.delegatees_of(user)
    }

    /// The users delegating to this user.
    pub fn delegators_of(&self, user: &User) -> Result<UserSet, SecurityError> {
        self.store.delegators_of(user)
    }

    // ---- evaluation ----

    /// Builds the point-in-time dynamic ACL for the user.
    ///
    /// The snapshot covers the user's own groups plus the groups of
    /// every user reachable over delegatee edges. Traversal is
    /// visited-set bounded, so delegation cycles terminate. Later
    /// graph mutations are not reflected; build a fresh ACL to see
    /// them.
    pub fn acl_for(&self, user: &User) -> Result<DynamicAccessControlList, SecurityError> {
        let (roles_by_group, permissions_by_role) = self.store.dynamic_snapshot(user)?;
        Ok(DynamicAccessControlList::new(
            roles_by_group,
            permissions_by_role,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EntityStore;

    struct Fixture {
        model: DynamicModelManager,
        store: Arc<MemoryStore>,
        alice: User,
        front_desk: Group,
        receptionist: Role,
        answer_phone: Permission,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let model = DynamicModelManager::new(Arc::clone(&store));
        let alice = store.persist_new(User::new("alice")).expect("user");
        let front_desk = store.persist_new(Group::new("front_desk")).expect("group");
        let receptionist = store.persist_new(Role::new("receptionist")).expect("role");
        let answer_phone = store
            .persist_new(Permission::new("answer_phone"))
            .expect("permission");
        Fixture {
            model,
            store,
            alice,
            front_desk,
            receptionist,
            answer_phone,
        }
    }

    fn wire_chain(f: &Fixture) {
        f.model
            .grant_membership(&f.alice, &f.front_desk)
            .expect("membership");
        f.model
            .grant_role(&f.front_desk, &f.receptionist)
            .expect("role");
        f.model
            .grant_permission(&f.receptionist, &f.answer_phone)
            .expect("permission");
    }

    #[test]
    fn full_chain_reaches_the_permission() {
        let f = fixture();
        wire_chain(&f);
        let acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(acl.has_role(&f.receptionist));
        assert!(acl.has_permission(&f.answer_phone));
        assert!(acl.has_permission_in(&f.answer_phone, &f.front_desk));
    }

    #[test]
    fn revoking_the_group_breaks_the_chain() {
        let f = fixture();
        wire_chain(&f);
        f.model.revoke_all_group(&f.front_desk).expect("revoke all");

        let acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(!acl.has_role(&f.receptionist));
        assert!(!acl.has_permission(&f.answer_phone));
        // The role still carries the permission; only the group links
        // went away.
        assert!(f
            .model
            .store
            .permissions_of_role(&f.receptionist)
            .expect("permissions")
            .contains(&f.answer_phone));
    }

    #[test]
    fn revoke_all_role_leaves_no_back_references() {
        let f = fixture();
        wire_chain(&f);
        f.model.revoke_all_role(&f.receptionist).expect("revoke all");

        assert!(f
            .store
            .roles_of_group(&f.front_desk)
            .expect("roles")
            .is_empty());
        assert!(f
            .store
            .roles_of_permission(&f.answer_phone)
            .expect("roles")
            .is_empty());
    }

    #[test]
    fn delegation_folds_the_delegatee_grants_in() {
        let f = fixture();
        wire_chain(&f);
        let bob = f.store.persist_new(User::new("bob")).expect("user");

        // Bob has nothing of his own.
        assert!(!f.model.acl_for(&bob).expect("acl").has_role(&f.receptionist));

        f.model.add_delegate(&bob, &f.alice).expect("delegate");
        let acl = f.model.acl_for(&bob).expect("acl");
        assert!(acl.has_role(&f.receptionist));
        assert!(acl.has_permission(&f.answer_phone));

        // Direction matters: alice delegating out gains bob nothing
        // new, and removing the link restores the empty ACL.
        f.model.remove_delegate(&bob, &f.alice).expect("remove");
        assert!(!f.model.acl_for(&bob).expect("acl").has_role(&f.receptionist));
    }

    #[test]
    fn mutual_delegation_merges_both_sides_and_terminates() {
        let f = fixture();
        wire_chain(&f);
        let bob = f.store.persist_new(User::new("bob")).expect("user");
        let back_office = f.store.persist_new(Group::new("back_office")).expect("group");
        let clerk = f.store.persist_new(Role::new("clerk")).expect("role");
        f.model.grant_membership(&bob, &back_office).expect("membership");
        f.model.grant_role(&back_office, &clerk).expect("role");

        f.model.add_delegate(&f.alice, &bob).expect("a->b");
        f.model.add_delegate(&bob, &f.alice).expect("b->a");

        let alice_acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(alice_acl.has_role(&f.receptionist));
        assert!(alice_acl.has_role(&clerk));
        let bob_acl = f.model.acl_for(&bob).expect("acl");
        assert!(bob_acl.has_role(&f.receptionist));
        assert!(bob_acl.has_role(&clerk));
    }

    #[test]
    fn removing_an_absent_delegation_is_an_error() {
        let f = fixture();
        let bob = f.store.persist_new(User::new("bob")).expect("user");
        assert!(f.model.remove_delegate(&f.alice, &bob).is_err());
        // Adding twice is fine.
        f.model.add_delegate(&f.alice, &bob).expect("add");
        f.model.add_delegate(&f.alice, &bob).expect("re-add");
    }

    #[test]
    fn revoke_all_user_clears_delegations_too() {
        let f = fixture();
        wire_chain(&f);
        let bob = f.store.persist_new(User::new("bob")).expect("user");
        f.model.add_delegate(&bob, &f.alice).expect("delegate");

        f.model.revoke_all_user(&f.alice).expect("revoke all");
        assert!(f.store.groups_of_user(&f.alice).expect("groups").is_empty());
        assert!(f.model.delegators_of(&f.alice).expect("delegators").is_empty());
        assert!(f.model.delegatees_of(&bob).expect("delegatees").is_empty());
    }
}
