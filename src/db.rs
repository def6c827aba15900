//! LMDB-backed node store
//!
//! Storage patterns:
//! - `node` -> parent id
//! - `node/group` -> permission mask (assignments)
//! - `group/node` -> permission mask (reverse index, kept in sync)

use std::collections::HashSet;

use byteorder::BigEndian;
use heed::types::{Bytes, I64, U32};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::debug;

use crate::config::StoreConfig;
use crate::constants::ROOT_PARENT;
use crate::error::{err, Error, Result, StoreError};
use crate::model::{Assignment, ContentNode, GroupId, NodeId};
use crate::permission::PermissionSet;
use crate::store::NodeStore;

type Db = Database<Bytes, U32<BigEndian>>;
type NodeDb = Database<I64<BigEndian>, I64<BigEndian>>;

/// Create a 16-byte key from two ids
#[inline]
pub fn key(a: i64, b: i64) -> [u8; 16] {
    let mut k = [0u8; 16];
    k[..8].copy_from_slice(&a.to_be_bytes());
    k[8..].copy_from_slice(&b.to_be_bytes());
    k
}

fn decode(raw: u32) -> std::result::Result<PermissionSet, StoreError> {
    PermissionSet::from_bits(raw).ok_or_else(|| StoreError::Corrupt(format!("permission mask {:#x}", raw)))
}

/// Bidirectional index: fwd[a,b] and rev[b,a] stay in sync
struct BiPair {
    fwd: Db,
    rev: Db,
}

impl BiPair {
    #[inline]
    fn get(&self, tx: &RoTxn, a: i64, b: i64) -> std::result::Result<Option<u32>, StoreError> {
        Ok(self.fwd.get(tx, &key(a, b))?)
    }

    #[inline]
    fn put(&self, tx: &mut RwTxn, a: i64, b: i64, v: u32) -> std::result::Result<(), StoreError> {
        self.fwd.put(tx, &key(a, b), &v)?;
        Ok(self.rev.put(tx, &key(b, a), &v)?)
    }

    #[inline]
    fn del(&self, tx: &mut RwTxn, a: i64, b: i64) -> std::result::Result<bool, StoreError> {
        let r = self.fwd.delete(tx, &key(a, b))?;
        self.rev.delete(tx, &key(b, a))?;
        Ok(r)
    }

    fn list_fwd(&self, tx: &RoTxn, a: i64) -> std::result::Result<Vec<(i64, u32)>, StoreError> {
        Self::list_pfx(tx, &self.fwd, a)
    }

    fn list_rev(&self, tx: &RoTxn, b: i64) -> std::result::Result<Vec<(i64, u32)>, StoreError> {
        Self::list_pfx(tx, &self.rev, b)
    }

    fn list_pfx(tx: &RoTxn, db: &Db, pfx: i64) -> std::result::Result<Vec<(i64, u32)>, StoreError> {
        let mut r = Vec::new();
        for item in db.prefix_iter(tx, &pfx.to_be_bytes())? {
            let (k, v) = item?;
            let tail: [u8; 8] = k
                .get(8..16)
                .and_then(|t| t.try_into().ok())
                .ok_or_else(|| StoreError::Corrupt(format!("key of {} bytes", k.len())))?;
            r.push((i64::from_be_bytes(tail), v));
        }
        Ok(r)
    }

    fn clear(&self, tx: &mut RwTxn) -> std::result::Result<(), StoreError> {
        self.fwd.clear(tx)?;
        Ok(self.rev.clear(tx)?)
    }
}

/// Node tree and assignments persisted in an LMDB environment
pub struct LmdbStore {
    env: Env,
    nodes: NodeDb,
    assignments: BiPair,
}

impl LmdbStore {
    /// Open (or create) the environment described by `cfg`
    pub fn open(cfg: &StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&cfg.path).map_err(err)?;
        // SAFETY: LMDB requires no other process to open this path with different flags concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(cfg.map_size)
                .max_readers(cfg.max_readers)
                .max_dbs(3)
                .open(&cfg.path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let nodes = env.create_database(&mut tx, Some("nodes")).map_err(err)?;
        let assignments = BiPair {
            fwd: env.create_database(&mut tx, Some("assign")).map_err(err)?,
            rev: env.create_database(&mut tx, Some("assign_rev")).map_err(err)?,
        };
        tx.commit().map_err(err)?;
        debug!(path = %cfg.path.display(), map_size = cfg.map_size, "opened lmdb store");
        Ok(LmdbStore { env, nodes, assignments })
    }

    fn read<T, F: FnOnce(&RoTxn) -> std::result::Result<T, StoreError>>(&self, f: F) -> std::result::Result<T, StoreError> {
        f(&self.env.read_txn()?)
    }

    fn write<T, F: FnOnce(&mut RwTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = self.env.write_txn().map_err(err)?;
        let r = f(&mut tx)?;
        tx.commit().map_err(err)?;
        Ok(r)
    }

    /// Insert or move a node. Rejects a parent chain that leads back to the node.
    pub fn put_node(&self, node: ContentNode) -> Result<()> {
        self.write(|tx| {
            self.no_cycle(tx, node)?;
            self.nodes.put(tx, &node.id, &node.parent_id).map_err(err)
        })
    }

    /// Remove a node and every assignment recorded at it
    pub fn remove_node(&self, id: NodeId) -> Result<bool> {
        self.write(|tx| {
            for (group, _) in self.assignments.list_fwd(tx, id).map_err(err)? {
                self.assignments.del(tx, id, group).map_err(err)?;
            }
            self.nodes.delete(tx, &id).map_err(err)
        })
    }

    /// Record `codes` for `group` at `node`, replacing any previous set
    pub fn assign(&self, group: GroupId, node: NodeId, codes: PermissionSet) -> Result<()> {
        self.write(|tx| self.assignments.put(tx, node, group, codes.bits()).map_err(err))
    }

    pub fn unassign(&self, group: GroupId, node: NodeId) -> Result<bool> {
        self.write(|tx| self.assignments.del(tx, node, group).map_err(err))
    }

    /// The set recorded for `group` directly at `node`
    pub fn assignment(&self, group: GroupId, node: NodeId) -> Result<Option<PermissionSet>> {
        self.read(|tx| self.assignments.get(tx, node, group)?.map(decode).transpose())
            .map_err(err)
    }

    /// Nodes where `group` has an assignment, via the reverse index
    pub fn nodes_for_group(&self, group: GroupId) -> Result<Vec<(NodeId, PermissionSet)>> {
        self.read(|tx| {
            self.assignments
                .list_rev(tx, group)?
                .into_iter()
                .map(|(node, raw)| Ok((node, decode(raw)?)))
                .collect()
        })
        .map_err(err)
    }

    pub fn node_count(&self) -> Result<u64> {
        self.read(|tx| Ok(self.nodes.len(tx)?)).map_err(err)
    }

    /// Clear all databases
    pub fn clear(&self) -> Result<()> {
        self.write(|tx| {
            self.nodes.clear(tx).map_err(err)?;
            self.assignments.clear(tx).map_err(err)
        })
    }

    fn no_cycle(&self, tx: &RoTxn, node: ContentNode) -> Result<()> {
        let mut seen = HashSet::new();
        let mut cur = node.parent_id;
        while cur != ROOT_PARENT {
            if cur == node.id || !seen.insert(cur) {
                return Err(Error::CycleDetected(node.id));
            }
            match self.nodes.get(tx, &cur).map_err(err)? {
                Some(p) => cur = p,
                None => break,
            }
        }
        Ok(())
    }
}

impl NodeStore for LmdbStore {
    fn node(&self, id: NodeId) -> std::result::Result<Option<ContentNode>, StoreError> {
        self.read(|tx| Ok(self.nodes.get(tx, &id)?.map(|parent| ContentNode::new(id, parent))))
    }

    fn assignments(&self, node_id: NodeId) -> std::result::Result<Vec<Assignment>, StoreError> {
        self.read(|tx| {
            self.assignments
                .list_fwd(tx, node_id)?
                .into_iter()
                .map(|(group, raw)| Ok(Assignment::new(group, node_id, decode(raw)?)))
                .collect()
        })
    }
}
