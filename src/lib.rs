//! nodeperm - Hierarchical permission resolution for content trees
//!
//! Given a tree of content nodes and per-node group assignments, work out
//! which groups hold a permission on a node. Permissions are inherited from
//! ancestors; a group narrowed to a single other permission at a nearer node
//! stays narrowed no matter what is granted further up.
//!
//! ```
//! use nodeperm::{ContentNode, MemoryStore, PermissionCode, PermissionResolver, PermissionSet};
//!
//! let mut store = MemoryStore::new();
//! store
//!     .insert_node(ContentNode::root(1))
//!     .insert_node(ContentNode::new(2, 1))
//!     .assign(1, 1, PermissionSet::parse_letters("FA").unwrap());
//!
//! let resolver = PermissionResolver::new(store);
//! let groups = resolver.groups_with_permission(2, PermissionCode::Update).unwrap();
//! assert!(groups.contains(&1));
//! ```

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod memory;
pub mod model;
pub mod permission;
pub mod reader;
pub mod resolver;
pub mod store;

pub use config::StoreConfig;
pub use constants::ROOT_PARENT;
pub use db::LmdbStore;
pub use error::{Error, Result, StoreError};
pub use memory::{MemoryStore, Snapshot};
pub use model::{Assignment, ContentNode, GroupId, NodeId, User, UserId, UserState};
pub use permission::{PermissionCode, PermissionSet};
pub use reader::PermissionsReader;
pub use resolver::{active_members_of_group, PermissionResolver, ResolutionState};
pub use store::{NodeStore, UserDirectory};
