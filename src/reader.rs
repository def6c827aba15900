//! Combined permission reader over a node store and a user directory

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::model::{GroupId, NodeId, User, UserId};
use crate::permission::PermissionCode;
use crate::resolver::{active_members_of_group, PermissionResolver};
use crate::store::{NodeStore, UserDirectory};

pub struct PermissionsReader<S, D> {
    resolver: PermissionResolver<S>,
    directory: D,
}

impl<S: NodeStore, D: UserDirectory> PermissionsReader<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        PermissionsReader {
            resolver: PermissionResolver::new(store),
            directory,
        }
    }

    pub fn resolver(&self) -> &PermissionResolver<S> {
        &self.resolver
    }

    pub fn groups_with_permission(&self, node: NodeId, code: PermissionCode) -> Result<BTreeSet<GroupId>> {
        self.resolver.groups_with_permission(node, code)
    }

    pub fn active_users_in_group(&self, group: GroupId) -> Result<Vec<User>> {
        active_members_of_group(&self.directory, group)
    }

    /// Active users of every group holding `code` on `node`, one entry per user id
    pub fn users_with_permission(&self, node: NodeId, code: PermissionCode) -> Result<Vec<User>> {
        let mut users: BTreeMap<UserId, User> = BTreeMap::new();
        for group in self.groups_with_permission(node, code)? {
            for user in self.active_users_in_group(group)? {
                users.entry(user.id).or_insert(user);
            }
        }
        Ok(users.into_values().collect())
    }
}
