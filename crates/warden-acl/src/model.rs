//! Model dispatch: the closed set of authorization topologies.

use crate::{BasicAccessControlList, DynamicAccessControlList, TurbineAccessControlList};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three supported authorization topologies.
///
/// | Model | Graph |
/// |---------|-------|
/// | `Basic` | User–Group only |
/// | `Dynamic` | User–Group–Role–Permission many-to-many, plus user delegation |
/// | `Turbine` | ternary User×Group×Role, Role–Permission, global-group sentinel |
///
/// Hosts pick one model at configuration time; the set is closed, so
/// downstream code can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// Group membership only.
    Basic,
    /// Full role/permission graph with delegation.
    Dynamic,
    /// Group-scoped ternary role grants.
    Turbine,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Dynamic => "dynamic",
            Self::Turbine => "turbine",
        })
    }
}

/// A model-tagged access control list.
///
/// The common surface across models is deliberately thin (the models
/// answer different questions); callers configured for a model reach
/// the concrete evaluator through the accessors and may match
/// exhaustively since the set of variants is closed.
#[derive(Debug, Clone)]
pub enum AccessControlList {
    /// Basic-model evaluator.
    Basic(BasicAccessControlList),
    /// Dynamic-model evaluator.
    Dynamic(DynamicAccessControlList),
    /// Turbine-model evaluator.
    Turbine(TurbineAccessControlList),
}

impl AccessControlList {
    /// Which model this ACL was built under.
    #[must_use]
    pub fn model(&self) -> Model {
        match self {
            Self::Basic(_) => Model::Basic,
            Self::Dynamic(_) => Model::Dynamic,
            Self::Turbine(_) => Model::Turbine,
        }
    }

    /// The basic evaluator, if this is a basic-model ACL.
    #[must_use]
    pub fn as_basic(&self) -> Option<&BasicAccessControlList> {
        match self {
            Self::Basic(acl) => Some(acl),
            _ => None,
        }
    }

    /// The dynamic evaluator, if this is a dynamic-model ACL.
    #[must_use]
    pub fn as_dynamic(&self) -> Option<&DynamicAccessControlList> {
        match self {
            Self::Dynamic(acl) => Some(acl),
            _ => None,
        }
    }

    /// The turbine evaluator, if this is a turbine-model ACL.
    #[must_use]
    pub fn as_turbine(&self) -> Option<&TurbineAccessControlList> {
        match self {
            Self::Turbine(acl) => Some(acl),
            _ => None,
        }
    }
}

impl From<BasicAccessControlList> for AccessControlList {
    fn from(acl: BasicAccessControlList) -> Self {
        Self::Basic(acl)
    }
}

impl From<DynamicAccessControlList> for AccessControlList {
    fn from(acl: DynamicAccessControlList) -> Self {
        Self::Dynamic(acl)
    }
}

impl From<TurbineAccessControlList> for AccessControlList {
    fn from(acl: TurbineAccessControlList) -> Self {
        Self::Turbine(acl)
    }
}
