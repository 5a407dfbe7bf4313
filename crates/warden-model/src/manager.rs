//! Generic entity CRUD managers.
//!
//! One [`EntityManager`] type serves all four entity kinds; the type
//! parameter picks the kind, the [`EntityStore`] parameter picks the
//! backend. Construction of new entities goes through the
//! [`SecurityEntity::named`] factory, so the manager never needs to
//! know the concrete type it manages.
//!
//! Managers own no state beyond an `Arc` to the store, so cloning one
//! is cheap and many managers may share a single store.

use crate::provider::EntityStore;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use warden_types::{EntityId, SecurityEntity, SecurityError, SecuritySet};

/// Name-keyed CRUD manager for one entity kind.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_model::{MemoryStore, RoleManager};
/// use warden_types::SecurityEntity;
///
/// let store = Arc::new(MemoryStore::new());
/// let roles = RoleManager::new(Arc::clone(&store));
///
/// let role = roles.add(roles.instance("Receptionist")).expect("add");
/// assert!(role.id().is_some());
/// assert!(roles.check_exists_name("receptionist").expect("probe"));
/// ```
#[derive(Debug)]
pub struct EntityManager<T, S> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> T>,
}

/// [`EntityManager`] over [`User`](warden_types::User)s.
pub type UserManager<S> = EntityManager<warden_types::User, S>;
/// [`EntityManager`] over [`Group`](warden_types::Group)s.
pub type GroupManager<S> = EntityManager<warden_types::Group, S>;
/// [`EntityManager`] over [`Role`](warden_types::Role)s.
pub type RoleManager<S> = EntityManager<warden_types::Role, S>;
/// [`EntityManager`] over [`Permission`](warden_types::Permission)s.
pub type PermissionManager<S> = EntityManager<warden_types::Permission, S>;

impl<T, S> Clone for EntityManager<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T, S> EntityManager<T, S>
where
    T: SecurityEntity,
    S: EntityStore<T>,
{
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Builds an unpersisted entity with the given name. Does not
    /// touch the store; pass the result to [`add`](Self::add).
    #[must_use]
    pub fn instance(&self, name: &str) -> T {
        T::named(name)
    }

    /// Persists a new entity, assigning its id.
    ///
    /// # Errors
    ///
    /// - [`SecurityError::InvalidEntity`] if the name is empty or the
    ///   id was already set (ids are store-assigned),
    /// - [`SecurityError::EntityExists`] if the name is taken
    ///   (case-insensitively).
    pub fn add(&self, entity: T) -> Result<T, SecurityError> {
        if entity.name().is_empty() {
            return Err(SecurityError::InvalidEntity {
                kind: T::KIND,
                reason: "name must not be empty",
            });
        }
        if entity.id().is_some() {
            return Err(SecurityError::InvalidEntity {
                kind: T::KIND,
                reason: "id must be unassigned before add",
            });
        }
        if self.store.exists_by_name(entity.name())? {
            return Err(SecurityError::EntityExists {
                kind: T::KIND,
                name: entity.name().to_owned(),
            });
        }
        let persisted = self.store.persist_new(entity)?;
        debug!(kind = %T::KIND, name = %persisted.name(), "entity added");
        Ok(persisted)
    }

    /// Deletes a persisted entity.
    ///
    /// Run the owning model manager's `revoke_all` for this entity
    /// first; the store does not cascade edges on delete.
    ///
    /// # Errors
    ///
    /// [`SecurityError::UnknownEntity`] if the entity was never
    /// persisted or is already gone.
    pub fn remove(&self, entity: &T) -> Result<(), SecurityError> {
        let id = self.require_persisted(entity)?;
        self.store.delete(id)?;
        debug!(kind = %T::KIND, name = %entity.name(), "entity removed");
        Ok(())
    }

    /// Renames a persisted entity, returning the renamed copy.
    ///
    /// # Errors
    ///
    /// - [`SecurityError::UnknownEntity`] if `entity` is not persisted,
    /// - [`SecurityError::InvalidEntity`] if the new name is empty,
    /// - [`SecurityError::EntityExists`] if the new name is taken.
    pub fn rename(&self, entity: &T, new_name: &str) -> Result<T, SecurityError> {
        let id = self.require_persisted(entity)?;
        let renamed = T::named(new_name);
        if renamed.name().is_empty() {
            return Err(SecurityError::InvalidEntity {
                kind: T::KIND,
                reason: "name must not be empty",
            });
        }
        if renamed.name() != entity.name() && self.store.exists_by_name(renamed.name())? {
            return Err(SecurityError::EntityExists {
                kind: T::KIND,
                name: renamed.name().to_owned(),
            });
        }
        let renamed = renamed.into_persisted(id);
        self.store.update(&renamed)?;
        debug!(kind = %T::KIND, from = %entity.name(), to = %renamed.name(), "entity renamed");
        Ok(renamed)
    }

    /// The entity with this name (case-insensitive).
    pub fn by_name(&self, name: &str) -> Result<T, SecurityError> {
        self.store.by_name(name)
    }

    /// The entity with this id.
    pub fn by_id(&self, id: EntityId) -> Result<T, SecurityError> {
        self.store.by_id(id)
    }

    /// Every entity of this kind, as a fresh set.
    pub fn all(&self) -> Result<SecuritySet<T>, SecurityError> {
        self.store.all()
    }

    /// `true` if an entity with this entity's name is persisted.
    /// Existence is name-keyed, matching set membership.
    pub fn check_exists(&self, entity: &T) -> Result<bool, SecurityError> {
        self.check_exists_name(entity.name())
    }

    /// `true` if an entity of this kind carries the name
    /// (case-insensitive).
    pub fn check_exists_name(&self, name: &str) -> Result<bool, SecurityError> {
        self.store.exists_by_name(name)
    }

    fn require_persisted(&self, entity: &T) -> Result<EntityId, SecurityError> {
        match entity.id() {
            Some(id) if self.store.by_id(id).is_ok() => Ok(id),
            _ => Err(SecurityError::unknown(T::KIND, entity.name())),
        }
    }
}
