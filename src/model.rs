//! Content nodes, assignments and users as supplied by the collaborators

use serde::{Deserialize, Serialize};

use crate::constants::ROOT_PARENT;
use crate::permission::PermissionSet;

pub type NodeId = i64;
pub type GroupId = i64;
pub type UserId = i64;

/// A node of the content tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: NodeId,
    pub parent_id: NodeId,
}

impl ContentNode {
    pub fn new(id: NodeId, parent_id: NodeId) -> Self {
        ContentNode { id, parent_id }
    }

    pub fn root(id: NodeId) -> Self {
        ContentNode { id, parent_id: ROOT_PARENT }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}

/// Permission codes recorded for one group directly at one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub group_id: GroupId,
    pub node_id: NodeId,
    pub codes: PermissionSet,
}

impl Assignment {
    pub fn new(group_id: GroupId, node_id: NodeId, codes: PermissionSet) -> Self {
        Assignment { group_id, node_id, codes }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
    #[default]
    Active,
    Disabled,
    LockedOut,
    Invited,
    Inactive,
}

/// A back-office user as listed by a [`UserDirectory`](crate::UserDirectory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "approved_default")]
    pub approved: bool,
    #[serde(default)]
    pub locked_out: bool,
    #[serde(default)]
    pub state: UserState,
}

fn approved_default() -> bool {
    true
}

impl User {
    pub fn new(id: UserId, name: &str, email: &str) -> Self {
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            approved: true,
            locked_out: false,
            state: UserState::Active,
        }
    }

    /// Approved, not locked out and not disabled
    #[inline]
    pub fn is_active(&self) -> bool {
        self.approved && !self.locked_out && self.state != UserState::Disabled
    }
}
