//! Error taxonomy for the authorization core.
//!
//! One enum, four axes:
//!
//! | Variant | Meaning | Raised by |
//! |---------|---------|-----------|
//! | `UnknownEntity` | referenced entity is not in the backing store | manager mutations, lookups |
//! | `EntityExists` | creation under an already-taken name | `add` on entity managers |
//! | `InvalidEntity` | creation precondition failed (empty name, preset id) | `add` on entity managers |
//! | `Backend` | the persistence collaborator failed | storage seam, wrapped and chained |
//! | `UnsupportedOperation` | API surface deliberately absent | `SecuritySet::retain_all` |
//!
//! Evaluator queries never produce any of these: an unknown role or
//! group at evaluation time is an ordinary `false`/empty answer, not
//! an error. Errors are reserved for graph mutation and CRUD, where
//! the caller must know the operation was not applied.

use crate::EntityKind;
use thiserror::Error;

/// Error raised by managers and storage backends.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// An operation referenced an entity that does not exist in the
    /// backing store. Checked before any mutation happens.
    #[error("unknown {kind} '{name}'")]
    UnknownEntity {
        /// Which entity type the lookup missed.
        kind: EntityKind,
        /// The name (or displayed id) that was looked up.
        name: String,
    },

    /// Attempted creation of an entity whose name is already taken
    /// (names are unique per kind, case-insensitively).
    #[error("{kind} '{name}' already exists")]
    EntityExists {
        /// Which entity type collided.
        kind: EntityKind,
        /// The colliding name.
        name: String,
    },

    /// The entity fails a creation precondition: empty name, or an
    /// id already assigned before `add` (ids are store-assigned).
    #[error("invalid {kind}: {reason}")]
    InvalidEntity {
        /// Which entity type was rejected.
        kind: EntityKind,
        /// What precondition it failed.
        reason: &'static str,
    },

    /// The persistence collaborator failed. Always wraps the
    /// underlying cause; the core propagates rather than retries.
    #[error("data backend failure in {operation}")]
    Backend {
        /// The operation that was being persisted.
        operation: &'static str,
        /// The backend's own failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The operation is deliberately not part of the API.
    #[error("{operation} is not supported")]
    UnsupportedOperation {
        /// The refused operation.
        operation: &'static str,
    },
}

impl SecurityError {
    /// Convenience constructor for [`SecurityError::UnknownEntity`].
    #[must_use]
    pub fn unknown(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind,
            name: name.into(),
        }
    }

    /// Convenience constructor for [`SecurityError::Backend`].
    #[must_use]
    pub fn backend(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            operation,
            source: Box::new(source),
        }
    }
}

/// Machine-readable error code interface.
///
/// Codes are UPPER_SNAKE_CASE and stable; recoverability tells callers
/// whether retrying (or fixing input) can help.
///
/// # Example
///
/// ```
/// use warden_types::{EntityKind, ErrorCode, SecurityError};
///
/// let err = SecurityError::unknown(EntityKind::Role, "receptionist");
/// assert_eq!(err.code(), "UNKNOWN_ENTITY");
/// assert!(!err.is_recoverable());
/// ```
pub trait ErrorCode {
    /// Stable machine-readable code for this error.
    fn code(&self) -> &'static str;

    /// Whether retrying the operation may succeed.
    fn is_recoverable(&self) -> bool;
}

impl ErrorCode for SecurityError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownEntity { .. } => "UNKNOWN_ENTITY",
            Self::EntityExists { .. } => "ENTITY_EXISTS",
            Self::InvalidEntity { .. } => "INVALID_ENTITY",
            Self::Backend { .. } => "BACKEND",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Backend failures are transient by assumption; the graph
        // errors will not change on retry.
        matches!(self, Self::Backend { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_entity_names_the_missing_side() {
        let err = SecurityError::unknown(EntityKind::Group, "front_desk");
        assert_eq!(err.to_string(), "unknown group 'front_desk'");
    }

    #[test]
    fn backend_chains_the_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = SecurityError::backend("persist_new", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_recoverable());
    }

    #[test]
    fn codes_are_stable() {
        let err = SecurityError::EntityExists {
            kind: EntityKind::User,
            name: "bob".into(),
        };
        assert_eq!(err.code(), "ENTITY_EXISTS");
        assert!(!err.is_recoverable());
    }
}
