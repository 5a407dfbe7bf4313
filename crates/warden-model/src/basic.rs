//! Basic-model manager: users in groups, nothing else.

use crate::memory::MemoryStore;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_acl::BasicAccessControlList;
use warden_types::{Group, GroupSet, SecurityEntity, SecurityError, User, UserSet};

/// Mutation surface of the basic model.
///
/// The only relation is user↔group membership; role and permission
/// semantics are left to the host application.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_model::{BasicModelManager, EntityStore, MemoryStore};
/// use warden_types::{Group, User};
///
/// let store = Arc::new(MemoryStore::new());
/// let model = BasicModelManager::new(Arc::clone(&store));
///
/// let alice = store.persist_new(User::new("alice"))?;
/// let staff = store.persist_new(Group::new("staff"))?;
/// model.grant(&alice, &staff)?;
///
/// let acl = model.acl_for(&alice)?;
/// assert!(acl.has_group(&staff));
/// # Ok::<(), warden_types::SecurityError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BasicModelManager {
    store: Arc<MemoryStore>,
}

impl BasicModelManager {
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Adds the user to the group. Granting an existing membership is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// [`SecurityError::UnknownEntity`] naming whichever side is not
    /// persisted; nothing is mutated in that case.
    pub fn grant(&self, user: &User, group: &Group) -> Result<(), SecurityError> {
        self.store.link_membership(user, group)?;
        debug!(user = %user.name(), group = %group.name(), "membership granted");
        Ok(())
    }

    /// Removes the user from the group. Revoking an absent membership
    /// is a no-op.
    pub fn revoke(&self, user: &User, group: &Group) -> Result<(), SecurityError> {
        self.store.unlink_membership(user, group)?;
        debug!(user = %user.name(), group = %group.name(), "membership revoked");
        Ok(())
    }

    /// Removes the user from every group.
    pub fn revoke_all_user(&self, user: &User) -> Result<(), SecurityError> {
        let removed = self.store.clear_user_memberships(user)?;
        warn!(user = %user.name(), removed, "all memberships revoked for user");
        Ok(())
    }

    /// Removes every user from the group.
    pub fn revoke_all_group(&self, group: &Group) -> Result<(), SecurityError> {
        let removed = self.store.clear_group_memberships(group)?;
        warn!(group = %group.name(), removed, "all memberships revoked for group");
        Ok(())
    }

    /// The groups the user belongs to.
    pub fn groups_of(&self, user: &User) -> Result<GroupSet, SecurityError> {
        self.store.groups_of_user(user)
    }

    /// The users belonging to the group.
    pub fn users_in(&self, group: &Group) -> Result<UserSet, SecurityError> {
        self.store.users_in_group(group)
    }

    /// Builds the point-in-time basic ACL for the user. Later graph
    /// mutations do not affect it; build a fresh one to observe them.
    pub fn acl_for(&self, user: &User) -> Result<BasicAccessControlList, SecurityError> {
        Ok(BasicAccessControlList::new(self.store.groups_of_user(user)?))
    }
}
