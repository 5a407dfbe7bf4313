//! The persistence-provider seam.
//!
//! [`EntityStore`] is the narrow contract a storage backend implements
//! per entity type. The core calls it synchronously and treats any
//! failure as a backend error to propagate, never to interpret or
//! retry; retry policy belongs to the backend itself.
//!
//! # Architecture
//!
//! ```text
//! EntityStore<T> trait (THIS MODULE)      ← abstract definition
//!          │
//!          └── MemoryStore (memory.rs)    ← in-crate reference impl
//!              (durable backends live in their own crates)
//! ```

use warden_types::{EntityId, SecurityEntity, SecurityError, SecuritySet};

/// Per-entity-type persistence contract.
///
/// Implementors assign ids (`persist_new`), answer name-keyed
/// existence probes case-insensitively, and expose plain CRUD. All
/// methods are synchronous; a backend failure surfaces as
/// [`SecurityError::Backend`] with the cause chained.
pub trait EntityStore<T: SecurityEntity> {
    /// Persists an unpersisted entity, assigning its id.
    ///
    /// Returns the entity with the id set. The caller (the entity
    /// manager) has already verified the name is non-empty and free.
    fn persist_new(&self, entity: T) -> Result<T, SecurityError>;

    /// `true` if an entity of this type carries the name
    /// (case-insensitive).
    fn exists_by_name(&self, name: &str) -> Result<bool, SecurityError>;

    /// All entities of this type, as a fresh set.
    fn all(&self) -> Result<SecuritySet<T>, SecurityError>;

    /// The entity with this id, or `UnknownEntity`.
    fn by_id(&self, id: EntityId) -> Result<T, SecurityError>;

    /// The entity with this name (case-insensitive), or
    /// `UnknownEntity`.
    fn by_name(&self, name: &str) -> Result<T, SecurityError>;

    /// Replaces the stored row for this (persisted) entity.
    fn update(&self, entity: &T) -> Result<(), SecurityError>;

    /// Deletes the entity with this id, or `UnknownEntity`.
    ///
    /// Callers are responsible for running the model manager's
    /// `revoke_all` first so no edge dangles.
    fn delete(&self, id: EntityId) -> Result<(), SecurityError>;
}
