//! Permission resolution over the content tree (iterative, no recursion)
//!
//! A query walks from the target node to its root. Nearer nodes decide first:
//! a group narrowed to a single other code is denied for the rest of the walk,
//! and grants found further up only fill in groups not decided yet.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::model::{Assignment, ContentNode, GroupId, NodeId, User};
use crate::permission::PermissionCode;
use crate::store::{NodeStore, UserDirectory};

/// Allow and deny sets built during one walk
#[derive(Debug, Default)]
pub struct ResolutionState {
    allowed: BTreeSet<GroupId>,
    denied: HashSet<GroupId>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the assignments recorded at one node into the state
    pub fn apply(&mut self, code: PermissionCode, assignments: &[Assignment]) {
        for a in assignments.iter().filter(|a| !a.codes.is_sentinel()) {
            match a.codes.single() {
                // a group already granted by a nearer node stays granted
                Some(only) if only != code => {
                    if !self.allowed.contains(&a.group_id) {
                        self.denied.insert(a.group_id);
                    }
                }
                _ if a.codes.contains(code) && !self.denied.contains(&a.group_id) => {
                    self.allowed.insert(a.group_id);
                }
                _ => {}
            }
        }
    }

    pub fn is_allowed(&self, group: GroupId) -> bool {
        self.allowed.contains(&group)
    }

    pub fn is_denied(&self, group: GroupId) -> bool {
        self.denied.contains(&group)
    }

    pub fn into_allowed(self) -> BTreeSet<GroupId> {
        self.allowed
    }
}

/// Resolves which groups hold a permission on a node
#[derive(Debug, Clone)]
pub struct PermissionResolver<S> {
    store: S,
}

impl<S: NodeStore> PermissionResolver<S> {
    pub fn new(store: S) -> Self {
        PermissionResolver { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Groups holding `code` on `node_id`, accounting for inheritance and
    /// narrowing along the path to the root
    pub fn groups_with_permission(&self, node_id: NodeId, code: PermissionCode) -> Result<BTreeSet<GroupId>> {
        if code.is_none() {
            return Err(Error::InvalidQuery);
        }
        debug!(node = node_id, %code, "resolving groups");

        let mut node = self.fetch(node_id)?.ok_or(Error::NodeNotFound(node_id))?;
        let mut state = ResolutionState::new();
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(node.id) {
                warn!(node = node.id, start = node_id, "cycle in content tree");
                return Err(Error::CycleDetected(node.id));
            }

            let assignments = self
                .store
                .assignments(node.id)
                .map_err(|source| Error::StoreFailure { node: node.id, source })?;
            trace!(node = node.id, count = assignments.len(), "assignments");
            state.apply(code, &assignments);

            if node.is_root() {
                break;
            }
            node = match self.fetch(node.parent_id)? {
                Some(parent) => parent,
                None => {
                    warn!(node = node.id, parent = node.parent_id, "missing parent");
                    return Err(Error::BrokenAncestry { node: node.id, parent: node.parent_id });
                }
            };
        }

        let allowed = state.into_allowed();
        debug!(node = node_id, %code, groups = allowed.len(), levels = visited.len(), "resolved");
        Ok(allowed)
    }

    /// Whether `group` holds `code` on `node_id`
    pub fn has_permission(&self, node_id: NodeId, group: GroupId, code: PermissionCode) -> Result<bool> {
        Ok(self.groups_with_permission(node_id, code)?.contains(&group))
    }

    #[inline]
    fn fetch(&self, id: NodeId) -> Result<Option<ContentNode>> {
        self.store
            .node(id)
            .map_err(|source| Error::StoreFailure { node: id, source })
    }
}

/// Members of `group` who are approved, not locked out and not disabled
pub fn active_members_of_group<D: UserDirectory>(directory: &D, group: GroupId) -> Result<Vec<User>> {
    let users = directory
        .users_in_group(group)
        .map_err(|source| Error::DirectoryFailure { group, source })?;
    Ok(users.into_iter().filter(User::is_active).collect())
}
