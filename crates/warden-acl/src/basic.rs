//! Evaluator for the basic model (user–group membership only).

use warden_types::{Group, GroupSet};

/// Per-user snapshot of group memberships.
///
/// The basic model has no roles or permissions; the only question an
/// evaluator can answer is group membership. Like every ACL, this is
/// an immutable snapshot: built once per authorization decision,
/// read-only thereafter, blind to later grants and revokes.
#[derive(Debug, Clone)]
pub struct BasicAccessControlList {
    groups: GroupSet,
}

impl BasicAccessControlList {
    /// Builds the evaluator from the user's resolved group set.
    #[must_use]
    pub fn new(groups: GroupSet) -> Self {
        Self { groups }
    }

    /// Every group the user belongs to.
    #[must_use]
    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// `true` if the user belongs to this group (name-keyed, per
    /// [`SecuritySet`](warden_types::SecuritySet) semantics).
    pub fn has_group(&self, group: &Group) -> bool {
        self.groups.contains(group)
    }

    /// `true` if the user belongs to a group with this name
    /// (case-insensitive). Unknown names are `false`, never an error.
    pub fn has_group_name(&self, name: &str) -> bool {
        self.groups.contains_name(name)
    }
}
