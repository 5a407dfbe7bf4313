//! Turbine-model manager: role grants scoped to a group, with a
//! global-group sentinel for unscoped grants.

use crate::memory::MemoryStore;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_acl::TurbineAccessControlList;
use warden_types::{Group, Permission, Role, SecurityEntity, SecurityError, User};

/// Default name of the global group sentinel.
pub const GLOBAL_GROUP_NAME: &str = "global";

/// Mutation surface of the turbine model.
///
/// Grants are ternary: a user holds a role *in* a group. Application
/// wide grants use the global group, a perfectly ordinary group the
/// manager creates on demand under a configured name.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_model::{EntityStore, MemoryStore, TurbineModelManager};
/// use warden_types::{Role, User};
///
/// let store = Arc::new(MemoryStore::new());
/// let model = TurbineModelManager::new(Arc::clone(&store));
///
/// let alice = store.persist_new(User::new("alice"))?;
/// let admin = store.persist_new(Role::new("admin"))?;
/// let global = model.global_group()?;
/// model.grant(&alice, &global, &admin)?;
///
/// // Unscoped queries consult the global group only.
/// assert!(model.acl_for(&alice)?.has_role(&admin));
/// # Ok::<(), warden_types::SecurityError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TurbineModelManager {
    store: Arc<MemoryStore>,
    global_group_name: String,
}

impl TurbineModelManager {
    /// Creates a manager whose global group is named
    /// [`GLOBAL_GROUP_NAME`].
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self::with_global_group(store, GLOBAL_GROUP_NAME)
    }

    /// Creates a manager with a custom global group name.
    #[must_use]
    pub fn with_global_group(store: Arc<MemoryStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            global_group_name: name.into().to_lowercase(),
        }
    }

    /// The configured global group name.
    #[must_use]
    pub fn global_group_name(&self) -> &str {
        &self.global_group_name
    }

    /// Returns the global group, creating and persisting it on first
    /// use. Every call observes the same group id.
    pub fn global_group(&self) -> Result<Group, SecurityError> {
        self.store.fetch_or_create_group(&self.global_group_name)
    }

    /// Grants the role to the user, scoped to the group. Granting an
    /// existing relation is a no-op.
    ///
    /// # Errors
    ///
    /// [`SecurityError::UnknownEntity`] naming whichever of the three
    /// is not persisted; nothing is mutated in that case.
    pub fn grant(&self, user: &User, group: &Group, role: &Role) -> Result<(), SecurityError> {
        self.store.link_relation(user, group, role)?;
        debug!(user = %user.name(), group = %group.name(), role = %role.name(), "role granted");
        Ok(())
    }

    /// Revokes the user's role in the group.
    ///
    /// # Errors
    ///
    /// [`SecurityError::UnknownEntity`] if the relation does not exist.
    pub fn revoke(&self, user: &User, group: &Group, role: &Role) -> Result<(), SecurityError> {
        self.store.unlink_relation(user, group, role)?;
        debug!(user = %user.name(), group = %group.name(), role = %role.name(), "role revoked");
        Ok(())
    }

    /// Swaps `old_role` for `new_role` in every relation the user
    /// holds, preserving each relation's group scope. Atomic; a user
    /// with no `old_role` relations is left unchanged.
    pub fn replace(&self, user: &User, old_role: &Role, new_role: &Role) -> Result<(), SecurityError> {
        let rewritten = self.store.replace_role(user, old_role, new_role)?;
        debug!(
            user = %user.name(),
            old = %old_role.name(),
            new = %new_role.name(),
            rewritten,
            "role replaced"
        );
        Ok(())
    }

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

    /// Removes every relation the user participates in.
    pub fn revoke_all_user(&self, user: &User) -> Result<(), SecurityError> {
        let relations = self.store.clear_relations_of_user(user)?;
        warn!(user = %user.name(), relations, "all grants revoked for user");
        Ok(())
    }

    /// Removes every relation scoped to the group.
    pub fn revoke_all_group(&self, group: &Group) -> Result<(), SecurityError> {
        let relations = self.store.clear_relations_of_group(group)?;
        warn!(group = %group.name(), relations, "all grants revoked for group");
        Ok(())
    }

    /// Removes every relation granting the role and every permission
    /// the role carries.
    pub fn revoke_all_role(&self, role: &Role) -> Result<(), SecurityError> {
        let relations = self.store.clear_relations_of_role(role)?;
        let permissions = self.store.clear_role_permissions(role)?;
        warn!(role = %role.name(), relations, permissions, "all grants revoked for role");
        Ok(())
    }

    /// Builds the point-in-time turbine ACL for the user: one entry
    /// per relation, with the role's permissions resolved, the global
    /// group wired in for unscoped queries.
    pub fn acl_for(&self, user: &User) -> Result<TurbineAccessControlList, SecurityError> {
        let entries = self.store.turbine_snapshot(user)?;
        let global = self.global_group()?;
        Ok(TurbineAccessControlList::new(entries, global))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EntityStore;

    struct Fixture {
        model: TurbineModelManager,
        store: Arc<MemoryStore>,
        alice: User,
        crew: Group,
        pilot: Role,
        fly: Permission,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let model = TurbineModelManager::new(Arc::clone(&store));
        let alice = store.persist_new(User::new("alice")).expect("user");
        let crew = store.persist_new(Group::new("crew")).expect("group");
        let pilot = store.persist_new(Role::new("pilot")).expect("role");
        let fly = store.persist_new(Permission::new("fly")).expect("permission");
        Fixture {
            model,
            store,
            alice,
            crew,
            pilot,
            fly,
        }
    }

    #[test]
    fn scoped_grant_shows_up_in_the_group_not_globally() {
        let f = fixture();
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("grant");
        f.model.grant_permission(&f.pilot, &f.fly).expect("permission");

        let acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(acl.has_role_in(&f.pilot, &f.crew));
        assert!(acl.has_permission_in(&f.fly, &f.crew));
        // Unscoped queries consult the global group only.
        assert!(!acl.has_role(&f.pilot));
        assert!(!acl.has_permission(&f.fly));
    }

    #[test]
    fn global_grant_answers_unscoped_queries() {
        let f = fixture();
        let global = f.model.global_group().expect("global");
        f.model.grant(&f.alice, &global, &f.pilot).expect("grant");

        let acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(acl.has_role(&f.pilot));
        assert!(acl.has_role_in(&f.pilot, &global));
    }

    #[test]
    fn global_group_is_created_once() {
        let f = fixture();
        let first = f.model.global_group().expect("first");
        let second = f.model.global_group().expect("second");
        assert_eq!(first.id(), second.id());
        assert_eq!(f.model.global_group_name(), GLOBAL_GROUP_NAME);
    }

    #[test]
    fn custom_global_group_name_is_honored() {
        let store = Arc::new(MemoryStore::new());
        let model = TurbineModelManager::with_global_group(store, "Everyone");
        assert_eq!(model.global_group_name(), "everyone");
        assert_eq!(model.global_group().expect("global").name(), "everyone");
    }

    #[test]
    fn revoking_an_absent_relation_is_an_error() {
        let f = fixture();
        assert!(f.model.revoke(&f.alice, &f.crew, &f.pilot).is_err());
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("grant");
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("regrant is no-op");
        f.model.revoke(&f.alice, &f.crew, &f.pilot).expect("revoke");
        assert!(f.model.revoke(&f.alice, &f.crew, &f.pilot).is_err());
    }

    #[test]
    fn replace_preserves_group_scope() {
        let f = fixture();
        let copilot = f.store.persist_new(Role::new("copilot")).expect("role");
        let global = f.model.global_group().expect("global");
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("grant");
        f.model.grant(&f.alice, &global, &f.pilot).expect("grant");

        f.model.replace(&f.alice, &f.pilot, &copilot).expect("replace");

        let acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(acl.has_role_in(&copilot, &f.crew));
        assert!(acl.has_role(&copilot));
        assert!(!acl.has_role_in(&f.pilot, &f.crew));
        assert!(!acl.has_role(&f.pilot));
    }

    #[test]
    fn replace_with_the_same_role_keeps_the_grant() {
        let f = fixture();
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("grant");

        f.model.replace(&f.alice, &f.pilot, &f.pilot).expect("replace");

        let acl = f.model.acl_for(&f.alice).expect("acl");
        assert!(acl.has_role_in(&f.pilot, &f.crew));
    }

    #[test]
    fn revoke_all_group_cascades_relations() {
        let f = fixture();
        let bob = f.store.persist_new(User::new("bob")).expect("user");
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("grant");
        f.model.grant(&bob, &f.crew, &f.pilot).expect("grant");

        f.model.revoke_all_group(&f.crew).expect("revoke all");
        assert!(f.store.relations_of_user(&f.alice).expect("rels").is_empty());
        assert!(f.store.relations_of_user(&bob).expect("rels").is_empty());
    }

    #[test]
    fn revoke_all_role_drops_relations_and_permissions() {
        let f = fixture();
        f.model.grant(&f.alice, &f.crew, &f.pilot).expect("grant");
        f.model.grant_permission(&f.pilot, &f.fly).expect("permission");

        f.model.revoke_all_role(&f.pilot).expect("revoke all");
        assert!(f.store.relations_of_user(&f.alice).expect("rels").is_empty());
        assert!(f
            .store
            .permissions_of_role(&f.pilot)
            .expect("permissions")
            .is_empty());
    }
}
