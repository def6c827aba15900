//! Resolution tests over in-memory trees
//!
//! Covers inheritance through empty levels, narrowing, the "no permissions"
//! sentinel and the failure modes of a walk.

use std::collections::BTreeSet;
use std::sync::Arc;

use nodeperm::{
    Assignment, ContentNode, Error, MemoryStore, NodeId, NodeStore, PermissionCode, PermissionResolver,
    PermissionSet, ResolutionState, StoreError,
};
use nodeperm::PermissionCode::{Browse, Delete, Update};

fn browse_update() -> PermissionSet {
    PermissionSet::parse_letters("FA").unwrap()
}

fn browse_only() -> PermissionSet {
    PermissionSet::from(Browse)
}

/// Chain `1 -> 2 -> ... -> depth`, node 1 is the root
fn chain(depth: NodeId) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_node(ContentNode::root(1));
    for id in 2..=depth {
        store.insert_node(ContentNode::new(id, id - 1));
    }
    store
}

fn groups(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

// ============================================================================
// Inheritance
// ============================================================================

/// Node 1 (group 1 defined) -> node 2 (inherited)
#[test]
fn permissions_are_inherited_from_parent() {
    let mut store = chain(2);
    store.assign(1, 1, browse_update());

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[1]));
}

/// Node 1 (group 1 defined) -> node 2 (nothing) -> node 3 (inherited)
#[test]
fn permissions_are_inherited_from_ancestor() {
    let mut store = chain(3);
    store.assign(1, 1, browse_update());

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(3, Update).unwrap(), groups(&[1]));
}

/// Group 2 defined at node 2 does not hide group 1 inherited from node 1
#[test]
fn inherited_and_local_groups_combine() {
    let mut store = chain(2);
    store.assign(1, 1, browse_update()).assign(2, 2, browse_update());

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[1, 2]));
}

#[test]
fn no_assignments_on_path_is_empty() {
    let store = chain(4);
    let r = PermissionResolver::new(store);
    assert!(r.groups_with_permission(4, Update).unwrap().is_empty());
}

#[test]
fn root_node_itself_resolves() {
    let mut store = chain(1);
    store.assign(9, 1, browse_update());
    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(1, Browse).unwrap(), groups(&[9]));
    assert!(r.groups_with_permission(1, Delete).unwrap().is_empty());
}

/// Siblings do not leak into each other
#[test]
fn sibling_assignments_are_not_inherited() {
    let mut store = chain(1);
    store
        .insert_node(ContentNode::new(2, 1))
        .insert_node(ContentNode::new(3, 1))
        .assign(4, 2, browse_update());
    let r = PermissionResolver::new(store);
    assert!(r.groups_with_permission(3, Update).unwrap().is_empty());
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[4]));
}

// ============================================================================
// Narrowing
// ============================================================================

/// Node 2 narrows group 1 to browse only
#[test]
fn browse_only_stops_inheritance() {
    let mut store = chain(2);
    store.assign(1, 1, browse_update()).assign(1, 2, browse_only());

    let r = PermissionResolver::new(store);
    assert!(r.groups_with_permission(2, Update).unwrap().is_empty());
    // browse itself is still granted by the narrowing record
    assert_eq!(r.groups_with_permission(2, Browse).unwrap(), groups(&[1]));
}

#[test]
fn narrowing_one_group_leaves_others_inheriting() {
    let mut store = chain(2);
    store
        .assign(1, 1, browse_update())
        .assign(2, 1, browse_update())
        .assign(1, 2, browse_only());

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[2]));
}

/// Narrowing binds below the narrowing node but not above it
#[test]
fn narrowing_applies_only_below_its_node() {
    let mut store = chain(3);
    store.assign(1, 1, browse_update()).assign(1, 2, browse_only());

    let r = PermissionResolver::new(store);
    assert!(r.groups_with_permission(3, Update).unwrap().is_empty());
    assert!(r.groups_with_permission(2, Update).unwrap().is_empty());
    assert_eq!(r.groups_with_permission(1, Update).unwrap(), groups(&[1]));
}

/// A nearer grant wins over a farther narrowing
#[test]
fn nearer_grant_beats_farther_narrowing() {
    let mut store = chain(3);
    store.assign(1, 2, browse_only()).assign(1, 3, browse_update());

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(3, Update).unwrap(), groups(&[1]));
}

/// A single code equal to the query is a grant, not a narrowing
#[test]
fn single_matching_code_is_a_grant() {
    let mut store = chain(2);
    store.assign(1, 2, PermissionSet::from(Update));

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[1]));
    assert!(r.groups_with_permission(2, Browse).unwrap().is_empty());
}

/// Two codes that both exclude the query neither grant nor narrow
#[test]
fn multi_code_set_without_query_does_not_narrow() {
    let mut store = chain(2);
    store
        .assign(1, 1, browse_update())
        .assign(1, 2, PermissionSet::from(Browse).with(Delete));

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[1]));
}

/// Letters never match by containment: "FA" holds update, "F" does not
#[test]
fn legacy_letters_match_exactly() {
    let mut store = chain(2);
    store.assign_legacy(1, 1, &["FA"]).unwrap();
    store.assign_legacy(2, 1, &["F", "D"]).unwrap();

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[1]));
    assert_eq!(r.groups_with_permission(2, Delete).unwrap(), groups(&[2]));
}

// ============================================================================
// Sentinel
// ============================================================================

#[test]
fn sentinel_is_transparent() {
    let mut store = chain(3);
    store
        .assign(1, 1, browse_update())
        .assign(1, 2, PermissionSet::SENTINEL)
        .assign(1, 3, PermissionSet::SENTINEL);

    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(3, Update).unwrap(), groups(&[1]));
}

#[test]
fn sentinel_only_tree_is_empty() {
    let mut store = chain(2);
    store.assign_legacy(1, 1, &["-"]).unwrap();
    let r = PermissionResolver::new(store);
    assert!(r.groups_with_permission(2, Browse).unwrap().is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unknown_start_node_is_not_found() {
    let r = PermissionResolver::new(chain(2));
    assert!(matches!(r.groups_with_permission(42, Update), Err(Error::NodeNotFound(42))));
    // id 0 is not special
    assert!(matches!(r.groups_with_permission(0, Update), Err(Error::NodeNotFound(0))));
}

#[test]
fn querying_none_is_rejected() {
    let r = PermissionResolver::new(chain(2));
    assert!(matches!(r.groups_with_permission(2, PermissionCode::None), Err(Error::InvalidQuery)));
}

#[test]
fn missing_ancestor_is_broken_ancestry() {
    let mut store = chain(2);
    store.insert_node(ContentNode::new(5, 4));
    let r = PermissionResolver::new(store);
    assert!(matches!(
        r.groups_with_permission(5, Update),
        Err(Error::BrokenAncestry { node: 5, parent: 4 })
    ));
}

#[test]
fn cycle_is_detected() {
    let mut store = MemoryStore::new();
    store
        .insert_node(ContentNode::new(1, 3))
        .insert_node(ContentNode::new(2, 1))
        .insert_node(ContentNode::new(3, 2))
        .assign(1, 1, browse_update());
    let r = PermissionResolver::new(store);
    assert!(matches!(r.groups_with_permission(2, Update), Err(Error::CycleDetected(2))));
}

#[test]
fn self_parent_is_a_cycle() {
    let mut store = MemoryStore::new();
    store.insert_node(ContentNode::new(7, 7));
    let r = PermissionResolver::new(store);
    assert!(matches!(r.groups_with_permission(7, Browse), Err(Error::CycleDetected(7))));
}

/// Store failing assignment lookups for one node
struct FailingStore {
    inner: MemoryStore,
    broken: NodeId,
}

impl NodeStore for FailingStore {
    fn node(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError> {
        self.inner.node(id)
    }

    fn assignments(&self, node_id: NodeId) -> Result<Vec<Assignment>, StoreError> {
        if node_id == self.broken {
            return Err(StoreError::Corrupt("unreadable".into()));
        }
        self.inner.assignments(node_id)
    }
}

#[test]
fn store_failure_names_the_node() {
    let r = PermissionResolver::new(FailingStore { inner: chain(3), broken: 2 });
    match r.groups_with_permission(3, Update) {
        Err(Error::StoreFailure { node, source: StoreError::Corrupt(_) }) => assert_eq!(node, 2),
        other => panic!("unexpected: {:?}", other),
    }
    let msg = r.groups_with_permission(3, Update).unwrap_err().to_string();
    assert!(msg.contains("node 2"), "{}", msg);
}

/// Store that returns a fixed, possibly duplicated, assignment list per node
struct ListStore {
    inner: MemoryStore,
    lists: Vec<(NodeId, Vec<(i64, PermissionSet)>)>,
}

impl NodeStore for ListStore {
    fn node(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError> {
        self.inner.node(id)
    }

    fn assignments(&self, node_id: NodeId) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .lists
            .iter()
            .filter(|(n, _)| *n == node_id)
            .flat_map(|(n, list)| list.iter().map(move |&(g, codes)| Assignment::new(g, *n, codes)))
            .collect())
    }
}

/// Two records for one group at one node are applied in store order
#[test]
fn duplicate_records_apply_in_order() {
    let narrow_first = ListStore {
        inner: chain(2),
        lists: vec![(2, vec![(1, browse_only()), (1, browse_update())]), (1, vec![(1, browse_update())])],
    };
    let r = PermissionResolver::new(narrow_first);
    assert!(r.groups_with_permission(2, Update).unwrap().is_empty());

    let grant_first = ListStore {
        inner: chain(2),
        lists: vec![(2, vec![(1, browse_update()), (1, browse_only())]), (1, vec![(1, browse_update())])],
    };
    let r = PermissionResolver::new(grant_first);
    assert_eq!(r.groups_with_permission(2, Update).unwrap(), groups(&[1]));
}

#[test]
fn allowed_and_denied_stay_disjoint() {
    let grant = Assignment::new(1, 2, browse_update());
    let narrow = Assignment::new(1, 2, browse_only());

    let mut state = ResolutionState::new();
    state.apply(Update, &[grant, narrow]);
    assert!(state.is_allowed(1));
    assert!(!state.is_denied(1));

    let mut state = ResolutionState::new();
    state.apply(Update, &[narrow, grant]);
    assert!(state.is_denied(1));
    assert!(!state.is_allowed(1));
    // a farther grant cannot lift the narrowing
    state.apply(Update, &[grant]);
    assert!(!state.is_allowed(1));
    assert!(state.into_allowed().is_empty());
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn has_permission_checks_membership() {
    let mut store = chain(2);
    store.assign(1, 1, browse_update());
    let r = PermissionResolver::new(&store);
    assert!(r.has_permission(2, 1, Update).unwrap());
    assert!(!r.has_permission(2, 2, Update).unwrap());
}

#[test]
fn deep_tree_does_not_recurse() {
    let mut store = chain(50_000);
    store.assign(3, 1, browse_update());
    let r = PermissionResolver::new(store);
    assert_eq!(r.groups_with_permission(50_000, Update).unwrap(), groups(&[3]));
}

#[test]
fn resolver_is_shareable_across_threads() {
    let mut store = chain(10);
    store.assign(1, 1, browse_update()).assign(2, 5, browse_only());
    let r = Arc::new(PermissionResolver::new(store));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let r = Arc::clone(&r);
            std::thread::spawn(move || r.groups_with_permission(10, Update).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), groups(&[1]));
    }
}
