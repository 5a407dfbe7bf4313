//! Storage seam and mutation layer of the warden authorization
//! framework.
//!
//! `warden-types` defines the entities and `warden-acl` evaluates
//! snapshots; this crate is where the graph actually lives and
//! changes. It provides:
//!
//! - [`EntityStore`]: the per-entity-type persistence contract,
//! - [`MemoryStore`]: the lock-guarded in-memory reference backend,
//! - [`EntityManager`] (with [`UserManager`], [`GroupManager`],
//!   [`RoleManager`], [`PermissionManager`] aliases): name-keyed CRUD,
//! - the three model managers, one per authorization model, each with
//!   an `acl_for` factory that cuts a point-in-time ACL snapshot.
//!
//! # Architecture
//!
//! ```text
//! EntityManager<T, S>          BasicModelManager
//!   (CRUD per kind)            DynamicModelManager
//!        │                     TurbineModelManager
//!        │                           │        │
//!        │        grants/revokes ────┘        │ acl_for
//!        ▼                ▼                   ▼
//!   EntityStore<T> ── MemoryStore      warden-acl snapshots
//!                   (one RwLock, whole graph)
//! ```
//!
//! Managers share one store through an `Arc`; every logical operation
//! is atomic under the store's lock. ACLs are snapshots: mutations
//! after `acl_for` are invisible until a fresh ACL is built.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use warden_model::{DynamicModelManager, GroupManager, MemoryStore, RoleManager, UserManager};
//!
//! let store = Arc::new(MemoryStore::new());
//! let users = UserManager::new(Arc::clone(&store));
//! let groups = GroupManager::new(Arc::clone(&store));
//! let roles = RoleManager::new(Arc::clone(&store));
//! let model = DynamicModelManager::new(Arc::clone(&store));
//!
//! let alice = users.add(users.instance("alice"))?;
//! let staff = groups.add(groups.instance("staff"))?;
//! let editor = roles.add(roles.instance("editor"))?;
//!
//! model.grant_membership(&alice, &staff)?;
//! model.grant_role(&staff, &editor)?;
//! assert!(model.acl_for(&alice)?.has_role(&editor));
//! # Ok::<(), warden_types::SecurityError>(())
//! ```

mod basic;
mod dynamic;
mod manager;
mod memory;
mod provider;
mod turbine;

pub use basic::BasicModelManager;
pub use dynamic::DynamicModelManager;
pub use manager::{EntityManager, GroupManager, PermissionManager, RoleManager, UserManager};
pub use memory::{MemoryStore, UserGroupRole};
pub use provider::EntityStore;
pub use turbine::{TurbineModelManager, GLOBAL_GROUP_NAME};
