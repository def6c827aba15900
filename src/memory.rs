//! In-memory store for embedding, fixtures and tests

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{err, Result, StoreError};
use crate::model::{Assignment, ContentNode, GroupId, NodeId, User};
use crate::permission::PermissionSet;
use crate::store::{NodeStore, UserDirectory};

/// Owned node tree, assignments and user directory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: HashMap<NodeId, ContentNode>,
    assignments: BTreeMap<(NodeId, GroupId), PermissionSet>,
    users: BTreeMap<GroupId, Vec<User>>,
}

/// Serialized form accepted by [`MemoryStore::from_json`]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<ContentNode>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub users: Vec<GroupMembers>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupMembers {
    pub group_id: GroupId,
    pub users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON snapshot; permission sets use the letter form
    pub fn from_json(json: &str) -> Result<Self> {
        let snap: Snapshot = serde_json::from_str(json).map_err(err)?;
        let mut store = Self::new();
        for n in snap.nodes {
            store.insert_node(n);
        }
        for a in snap.assignments {
            store.assign(a.group_id, a.node_id, a.codes);
        }
        for g in snap.users {
            for u in g.users {
                store.add_user(g.group_id, u);
            }
        }
        Ok(store)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        let mut nodes: Vec<_> = self.nodes.values().copied().collect();
        nodes.sort_by_key(|n| n.id);
        Snapshot {
            nodes,
            assignments: self
                .assignments
                .iter()
                .map(|(&(node, group), &codes)| Assignment::new(group, node, codes))
                .collect(),
            users: self
                .users
                .iter()
                .map(|(&group_id, users)| GroupMembers { group_id, users: users.clone() })
                .collect(),
        }
    }

    /// Insert or replace a node
    pub fn insert_node(&mut self, node: ContentNode) -> &mut Self {
        self.nodes.insert(node.id, node);
        self
    }

    /// Record `codes` for `group` at `node`, replacing any previous set
    pub fn assign(&mut self, group: GroupId, node: NodeId, codes: PermissionSet) -> &mut Self {
        self.assignments.insert((node, group), codes);
        self
    }

    /// Record an assignment given in the letter-string form
    pub fn assign_legacy<S: AsRef<str>>(&mut self, group: GroupId, node: NodeId, entries: &[S]) -> Result<&mut Self> {
        let codes = PermissionSet::parse_legacy(entries)?;
        Ok(self.assign(group, node, codes))
    }

    pub fn unassign(&mut self, group: GroupId, node: NodeId) -> bool {
        self.assignments.remove(&(node, group)).is_some()
    }

    pub fn add_user(&mut self, group: GroupId, user: User) -> &mut Self {
        self.users.entry(group).or_default().push(user);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl NodeStore for MemoryStore {
    fn node(&self, id: NodeId) -> std::result::Result<Option<ContentNode>, StoreError> {
        Ok(self.nodes.get(&id).copied())
    }

    fn assignments(&self, node_id: NodeId) -> std::result::Result<Vec<Assignment>, StoreError> {
        Ok(self
            .assignments
            .range((node_id, GroupId::MIN)..=(node_id, GroupId::MAX))
            .map(|(&(node, group), &codes)| Assignment::new(group, node, codes))
            .collect())
    }
}

impl UserDirectory for MemoryStore {
    fn users_in_group(&self, group_id: GroupId) -> std::result::Result<Vec<User>, StoreError> {
        Ok(self.users.get(&group_id).cloned().unwrap_or_default())
    }
}
