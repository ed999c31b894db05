use std::collections::HashMap;
use std::fmt;

use crate::block::{BlockPointer, BlockRef};
use crate::path::{Path, PathNode};

use super::cache::NodeCacheError;

/// Stable id of a node core within one cache's arena.
///  Ids are never reused, so a core recreated for the same
///  identity always gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Shared mutable state of one filesystem object
#[derive(Debug)]
pub(super) struct NodeCore {
    pub path_node: PathNode,
    // arena key of the parent core. The link is counted as
    //  one hold on the parent, see `NodeTable::link_parent`
    pub parent: Option<NodeId>,
    // last known path, only set once the object is unlinked
    pub cached_path: Path,
    // handles plus child links pointing at this core
    holders: usize,
}

impl NodeCore {
    pub fn is_unlinked(&self) -> bool {
        !self.cached_path.is_empty()
    }
}

#[derive(Debug)]
struct CacheEntry {
    core: NodeId,
    ref_count: usize,
}

/**
 * Node Table
 * ==========
 * The table is two maps guarded together by the cache lock:
 *  - `cores` is the arena that owns every node core, keyed by
 *     `NodeId`. A core stays here while anything holds it.
 *  - `nodes` is the identity index, mapping a `BlockRef` to the
 *     core currently registered for it plus a reference count.
 * The two drift apart in exactly two cases: a detached entry is
 *  replaced by a fresh core for the same identity, or a rekey
 *  lands on an identity that was already taken. In both the old
 *  core drops out of the index but lives on in the arena until
 *  its last holder lets go, and releases against it no longer
 *  touch the index.
 */
#[derive(Debug, Default)]
pub(super) struct NodeTable {
    cores: HashMap<NodeId, NodeCore>,
    nodes: HashMap<BlockRef, CacheEntry>,
    next_id: u64,
}

impl NodeTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cores: HashMap::with_capacity(capacity),
            nodes: HashMap::with_capacity(capacity),
            next_id: 0,
        }
    }

    pub fn core(&self, id: NodeId) -> Option<&NodeCore> {
        self.cores.get(&id)
    }

    pub fn core_mut(&mut self, id: NodeId) -> Option<&mut NodeCore> {
        self.cores.get_mut(&id)
    }

    /// The core registered for `r`, if any
    pub fn lookup(&self, r: &BlockRef) -> Option<NodeId> {
        self.nodes.get(r).map(|entry| entry.core)
    }

    pub fn ref_count(&self, r: &BlockRef) -> Option<usize> {
        self.nodes.get(r).map(|entry| entry.ref_count)
    }

    pub fn num_entries(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_cores(&self) -> usize {
        self.cores.len()
    }

    /// Whether `id` is the core currently registered under its own identity
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.cores
            .get(&id)
            .map(|core| self.lookup(&core.path_node.block_ref()) == Some(id))
            .unwrap_or(false)
    }

    /// Resolve a parent handle's core to the live entry it must
    ///  correspond to
    pub fn resolve_parent(&self, id: NodeId) -> Result<NodeId, NodeCacheError> {
        let Some(core) = self.cores.get(&id) else {
            return Err(NodeCacheError::ParentNodeNotFound(BlockRef::default()));
        };
        let r = core.path_node.block_ref();
        match self.lookup(&r) {
            Some(registered) if registered == id => Ok(id),
            _ => Err(NodeCacheError::ParentNodeNotFound(r)),
        }
    }

    /// Add a new core for `pointer` under its identity, replacing whatever
    ///  entry was there. The entry starts out with no holders.
    pub fn insert(&mut self, pointer: BlockPointer, name: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        if let Some(parent) = parent {
            self.link_parent(parent);
        }

        let r = pointer.block_ref();
        self.cores.insert(
            id,
            NodeCore {
                path_node: PathNode::new(pointer, name),
                parent,
                cached_path: Path::default(),
                holders: 0,
            },
        );
        self.nodes.insert(r, CacheEntry { core: id, ref_count: 0 });
        id
    }

    /// Drop the index entry for `r` without touching its core
    pub fn evict(&mut self, r: &BlockRef) -> Option<NodeId> {
        self.nodes.remove(r).map(|entry| entry.core)
    }

    /// Move the entry registered under `old` to `new`. Returns the core
    ///  that was displaced from `new`, if any.
    pub fn rekey(&mut self, old: &BlockRef, new: BlockRef) -> Option<NodeId> {
        let entry = self.nodes.remove(old)?;
        self.nodes.insert(new, entry).map(|displaced| displaced.core)
    }

    /// Take a hold on the core registered under `r` for a new handle
    pub fn acquire_entry(&mut self, r: &BlockRef) -> Option<NodeId> {
        let entry = self.nodes.get_mut(r)?;
        entry.ref_count += 1;
        let id = entry.core;
        if let Some(core) = self.cores.get_mut(&id) {
            core.holders += 1;
        }
        Some(id)
    }

    /// Take another hold on a core that is already held. Only counts
    ///  against the index if the core is still the registered one.
    pub fn acquire(&mut self, id: NodeId) {
        let Some(core) = self.cores.get_mut(&id) else {
            return;
        };
        core.holders += 1;
        if let Some(entry) = self.nodes.get_mut(&core.path_node.block_ref()) {
            if entry.core == id {
                entry.ref_count += 1;
            }
        }
    }

    /// A child linking to `parent` holds it exactly like a handle would
    pub fn link_parent(&mut self, parent: NodeId) {
        self.acquire(parent);
    }

    /// Release one hold on `id`.
    ///
    /// The index entry loses a reference only if it still points at
    ///  this core; a release against a replaced entry leaves the index
    ///  alone. When the core itself has no holders left it leaves the
    ///  arena and gives up its hold on its parent, which can cascade
    ///  up the chain.
    pub fn forget(&mut self, id: NodeId) {
        let mut next = Some(id);
        while let Some(id) = next.take() {
            let Some(core) = self.cores.get_mut(&id) else {
                return;
            };

            let r = core.path_node.block_ref();
            if let Some(entry) = self.nodes.get_mut(&r) {
                if entry.core == id {
                    entry.ref_count = entry.ref_count.saturating_sub(1);
                    if entry.ref_count == 0 {
                        self.nodes.remove(&r);
                        tracing::debug!("Evicted {} from node cache", r);
                    }
                }
            }

            core.holders = core.holders.saturating_sub(1);
            if core.holders == 0 {
                next = self.cores.remove(&id).and_then(|core| core.parent);
            }
        }
    }

    /// Whether following parent links up from `from` reaches `target`
    pub fn is_ancestor(&self, target: NodeId, from: NodeId) -> bool {
        let mut next = Some(from);
        while let Some(id) = next {
            if id == target {
                return true;
            }
            next = self.cores.get(&id).and_then(|core| core.parent);
        }
        false
    }
}
