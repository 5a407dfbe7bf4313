//! Core types for the warden authorization framework.
//!
//! This crate provides the foundational vocabulary shared by every
//! other warden crate: entity identity, the four authorization-graph
//! node types, the uniqueness-enforcing [`SecuritySet`] collection,
//! and the error taxonomy.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  warden-types : ids, entities, SecuritySet, errors ◄ HERE │
//! └──────────────────────────────────────────────────────────┘
//!                            ↑
//! ┌──────────────────────────────────────────────────────────┐
//! │  warden-acl   : read-only ACL evaluators (no storage)     │
//! └──────────────────────────────────────────────────────────┘
//!                            ↑
//! ┌──────────────────────────────────────────────────────────┐
//! │  warden-model : storage seam, in-memory store, managers   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Entities are plain data**: relationship edges live in the
//!   store's index maps, never on the entities, so snapshots clone
//!   cheaply and there is no per-model entity subclassing.
//! - **Ids are assigned once**: by the backing store, through an
//!   injected [`IdSequence`]; unpersisted entities have no id.
//! - **Deterministic iteration**: sets iterate in ascending id
//!   order, keeping graph traversals and test output reproducible.
//! - **Errors are for mutation**: evaluator reads answer `false` or
//!   empty; only managers and backends raise [`SecurityError`].

pub mod entity;
pub mod error;
pub mod id;
pub mod set;

pub use entity::{Group, Permission, Role, SecurityEntity, User};
pub use error::{ErrorCode, SecurityError};
pub use id::{EntityId, EntityKind, IdSequence};
pub use set::{GroupSet, PermissionSet, RoleSet, SecuritySet, UserSet};
