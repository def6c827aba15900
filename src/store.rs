//! Read-only collaborator interfaces consumed by the resolver

use std::sync::Arc;

use crate::error::StoreError;
use crate::model::{Assignment, ContentNode, GroupId, NodeId, User};

/// Source of content nodes and the assignments recorded directly on them
pub trait NodeStore {
    /// Look up a node; `Ok(None)` when the id is unknown
    fn node(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError>;

    /// Assignments recorded at `node_id` only, without inheritance
    fn assignments(&self, node_id: NodeId) -> Result<Vec<Assignment>, StoreError>;
}

/// Source of user records by group membership
pub trait UserDirectory {
    fn users_in_group(&self, group_id: GroupId) -> Result<Vec<User>, StoreError>;
}

impl<S: NodeStore + ?Sized> NodeStore for &S {
    fn node(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError> {
        (**self).node(id)
    }

    fn assignments(&self, node_id: NodeId) -> Result<Vec<Assignment>, StoreError> {
        (**self).assignments(node_id)
    }
}

impl<S: NodeStore + ?Sized> NodeStore for Arc<S> {
    fn node(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError> {
        (**self).node(id)
    }

    fn assignments(&self, node_id: NodeId) -> Result<Vec<Assignment>, StoreError> {
        (**self).assignments(node_id)
    }
}

impl<D: UserDirectory + ?Sized> UserDirectory for &D {
    fn users_in_group(&self, group_id: GroupId) -> Result<Vec<User>, StoreError> {
        (**self).users_in_group(group_id)
    }
}

impl<D: UserDirectory + ?Sized> UserDirectory for Arc<D> {
    fn users_in_group(&self, group_id: GroupId) -> Result<Vec<User>, StoreError> {
        (**self).users_in_group(group_id)
    }
}
