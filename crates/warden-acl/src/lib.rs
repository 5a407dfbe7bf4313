//! Read-only access control list evaluators for warden.
//!
//! An ACL is a **per-user, per-decision snapshot**: the caller (a
//! model manager's `acl_for`, or any host that resolved the user's
//! edges itself) builds one evaluator per authorization decision, then
//! asks it "does this user have role/permission X, optionally scoped
//! to group Y?" any number of times. Evaluators perform no I/O and are
//! never mutated; a security change takes effect the next time an ACL
//! is built.
//!
//! # Architecture
//!
//! ```text
//! warden-model (storage, managers)      resolves edges + delegation
//!        │                              closure, then constructs:
//!        ▼
//! warden-acl  ◄── THIS CRATE
//!   BasicAccessControlList    groups only
//!   DynamicAccessControlList  group→role→permission, two-hop compose
//!   TurbineAccessControlList  group-keyed, global-group sentinel
//!   AccessControlList         closed dispatch enum over the three
//! ```
//!
//! # Failure Semantics
//!
//! Every query on every evaluator is a total function over its
//! snapshot: unknown roles, groups or permissions answer `false` or an
//! empty set. Errors belong to the mutation layer (`warden-model`);
//! "you don't have permission" and "the system could not determine
//! your permissions" must never be collapsed into one signal, so the
//! evaluators are structurally incapable of producing the latter.

pub mod basic;
pub mod dynamic;
pub mod model;
pub mod turbine;

pub use basic::BasicAccessControlList;
pub use dynamic::DynamicAccessControlList;
pub use model::{AccessControlList, Model};
pub use turbine::TurbineAccessControlList;
