use std::sync::Arc;

use parking_lot::RwLock;

use crate::block::{BlockPointer, BlockRef};
use crate::config::NodeCacheConfig;
use crate::folder::{FolderBranch, TlfId};
use crate::path::Path;

use super::node::Node;
use super::table::{NodeId, NodeTable};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeCacheError {
    #[error("empty name for {0}")]
    EmptyName(BlockRef),
    /// The parent handle doesn't map to a live entry of this
    ///  cache. Carries the zero ref if the handle came from a
    ///  different cache altogether.
    #[error("parent node not found: {0}")]
    ParentNodeNotFound(BlockRef),
}

/// Snapshot of cache occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCacheStats {
    /// identities currently in the index
    pub entries: usize,
    /// node cores still alive, including ones only reachable
    ///  through stale handles
    pub cores: usize,
}

/// State shared between a cache and the handles it hands out
pub(super) struct Shared {
    pub folder_branch: FolderBranch,
    pub table: RwLock<NodeTable>,
}

/// Tracks the live nodes of one folder-branch and rebuilds their paths
///
/// All mutations take the write lock for their whole duration, since
///  each is a lookup plus a conditional update. Path reconstruction only
///  takes the read lock.
#[derive(Clone)]
pub struct NodeCache(Arc<Shared>);

impl NodeCache {
    /// Create a cache for the master branch of `tlf`
    pub fn new(tlf: TlfId) -> Self {
        Self::with_config(tlf, NodeCacheConfig::default())
    }

    pub fn with_config(tlf: TlfId, config: NodeCacheConfig) -> Self {
        Self::for_folder_branch(
            FolderBranch::new(tlf, config.branch),
            config.initial_capacity,
        )
    }

    pub fn for_folder_branch(folder_branch: FolderBranch, capacity: usize) -> Self {
        NodeCache(Arc::new(Shared {
            folder_branch,
            table: RwLock::new(NodeTable::with_capacity(capacity)),
        }))
    }

    pub fn folder_branch(&self) -> &FolderBranch {
        &self.0.folder_branch
    }

    fn handle(&self, id: NodeId) -> Node {
        Node::new(self.0.clone(), id)
    }

    fn owns(&self, node: &Node) -> bool {
        Arc::ptr_eq(&self.0, node.shared())
    }

    /// Resolve `parent` to its core, checking it was issued by this
    ///  cache and is still the entry registered for its identity
    fn resolve_parent(&self, table: &NodeTable, parent: &Node) -> Result<NodeId, NodeCacheError> {
        if !self.owns(parent) {
            return Err(NodeCacheError::ParentNodeNotFound(BlockRef::default()));
        }
        table.resolve_parent(parent.id()).inspect_err(|err| {
            tracing::warn!("Rejected parent {}: {}", parent.id(), err);
        })
    }

    /// Get the node for `pointer`, creating it under `parent` if it
    ///  isn't cached yet.
    ///
    /// If the identity is cached but was unlinked, and a parent is
    ///  given, the object is being recreated at a new position: the
    ///  detached entry is dropped from the index and a fresh node
    ///  takes its place. Handles to the old node keep working but no
    ///  longer count against the index.
    ///
    /// # Panics
    ///
    /// If `pointer` is not valid.
    pub fn get_or_create(
        &self,
        pointer: BlockPointer,
        name: &str,
        parent: Option<&Node>,
    ) -> Result<Node, NodeCacheError> {
        assert!(pointer.is_valid(), "invalid block pointer {pointer}");

        let r = pointer.block_ref();
        if name.is_empty() {
            return Err(NodeCacheError::EmptyName(r));
        }

        let mut table = self.0.table.write();
        if let Some(existing) = table.lookup(&r) {
            let detached = table
                .core(existing)
                .map(|core| core.parent.is_none())
                .unwrap_or(true);
            if parent.is_none() || !detached {
                if let Some(id) = table.acquire_entry(&r) {
                    return Ok(self.handle(id));
                }
            }
        }

        let parent_id = match parent {
            Some(parent) => Some(self.resolve_parent(&table, parent)?),
            None => None,
        };

        if let Some(stale) = table.evict(&r) {
            tracing::debug!("Replacing detached {} for {} under a new parent", stale, r);
        }

        let id = table.insert(pointer, name.to_string(), parent_id);
        table.acquire(id);
        tracing::debug!("Created {} for {} ({})", id, r, name);
        Ok(self.handle(id))
    }

    /// Look up the node for `r`. The zero ref is never cached.
    ///
    /// # Panics
    ///
    /// If `r` is neither zero nor valid.
    pub fn get(&self, r: BlockRef) -> Option<Node> {
        if r.is_zero() {
            return None;
        }
        assert!(r.is_valid(), "invalid block ref {r}");

        let mut table = self.0.table.write();
        table.acquire_entry(&r).map(|id| self.handle(id))
    }

    /// Re-key the node registered under `old` to `new_pointer` after its
    ///  content moved. Existing handles follow the node.
    ///
    /// Unlinked nodes keep their pointer; the update is ignored for them.
    ///
    /// # Panics
    ///
    /// If either argument is invalid, unless both are zero.
    pub fn update_pointer(&self, old: BlockRef, new_pointer: BlockPointer) {
        if old.is_zero() && new_pointer.is_zero() {
            return;
        }
        assert!(
            old.is_valid(),
            "invalid old ref {old} with new pointer {new_pointer}"
        );
        assert!(
            new_pointer.is_valid(),
            "invalid new pointer {new_pointer} with old ref {old}"
        );

        let mut table = self.0.table.write();
        let Some(id) = table.lookup(&old) else {
            return;
        };
        let Some(core) = table.core_mut(id) else {
            return;
        };

        // the cached path pins an unlinked node's identity
        if core.is_unlinked() {
            tracing::warn!("Ignoring pointer update for unlinked {}", old);
            return;
        }

        core.path_node.pointer = new_pointer;
        let new = new_pointer.block_ref();
        if let Some(displaced) = table.rekey(&old, new) {
            if displaced != id {
                tracing::warn!("Pointer update for {} displaced {} at {}", old, displaced, new);
            }
        }
        tracing::debug!("Updated {} from {} to {}", id, old, new);
    }

    /// Re-parent and rename the node registered under `r`. A ref that
    ///  isn't cached is left alone.
    ///
    /// `new_parent` must not be the node itself or one of its
    ///  descendants. Debug builds panic on that; release builds leave a
    ///  parent cycle behind, which `path_from_node` never walks out of.
    ///
    /// # Panics
    ///
    /// If `r` is neither zero nor valid.
    pub fn mv(&self, r: BlockRef, new_parent: &Node, new_name: &str) -> Result<(), NodeCacheError> {
        if r.is_zero() {
            return Ok(());
        }
        assert!(r.is_valid(), "invalid block ref {r}");

        if new_name.is_empty() {
            return Err(NodeCacheError::EmptyName(r));
        }

        let mut table = self.0.table.write();
        let Some(id) = table.lookup(&r) else {
            return Ok(());
        };

        let parent_id = self.resolve_parent(&table, new_parent)?;
        debug_assert!(
            !table.is_ancestor(id, parent_id),
            "moving {r} under its own descendant"
        );

        table.link_parent(parent_id);
        let old_parent = table.core_mut(id).and_then(|core| {
            core.path_node.name = new_name.to_string();
            core.parent.replace(parent_id)
        });
        if let Some(old_parent) = old_parent {
            table.forget(old_parent);
        }
        tracing::debug!("Moved {} to {} under {}", r, new_name, parent_id);
        Ok(())
    }

    /// Detach the node registered under `r` from the tree, remembering
    ///  `old_path` as its last location for anyone still holding it.
    ///
    /// # Panics
    ///
    /// If `r` is neither zero nor valid.
    pub fn unlink(&self, r: BlockRef, old_path: Path) {
        if r.is_zero() {
            return;
        }
        assert!(r.is_valid(), "invalid block ref {r}");

        let mut table = self.0.table.write();
        let Some(id) = table.lookup(&r) else {
            return;
        };

        let old_parent = table.core_mut(id).and_then(|core| {
            core.cached_path = old_path;
            core.path_node.name.clear();
            core.parent.take()
        });
        if let Some(old_parent) = old_parent {
            table.forget(old_parent);
        }
        tracing::debug!("Unlinked {}", r);
    }

    /// Rebuild the full path of `node` from the root of the tree.
    ///
    /// Walks parent links up from the node. If the walk reaches an
    ///  unlinked node, that node's cached path stands in for the rest
    ///  of the way up. Handles from another cache get an empty path.
    pub fn path_from_node(&self, node: &Node) -> Path {
        if !self.owns(node) {
            return Path::default();
        }

        let table = self.0.table.read();
        let mut nodes = Vec::new();
        let mut next = Some(node.id());
        while let Some(id) = next {
            let Some(core) = table.core(id) else {
                break;
            };

            if core.parent.is_none() && core.is_unlinked() {
                if nodes.is_empty() {
                    return core.cached_path.clone();
                }
                // pushed leaf first, so splice the cached path in backwards
                nodes.extend(core.cached_path.nodes.iter().rev().cloned());
                break;
            }

            nodes.push(core.path_node.clone());
            next = core.parent;
        }
        nodes.reverse();

        Path::new(self.0.folder_branch.clone(), nodes)
    }

    /// Whether `node` was issued by this cache and is still the node
    ///  registered for its identity
    pub fn contains(&self, node: &Node) -> bool {
        self.owns(node) && self.0.table.read().is_registered(node.id())
    }

    /// Number of identities in the index
    pub fn len(&self) -> usize {
        self.0.table.read().num_entries()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outstanding references on the entry for `r`: live handles plus
    ///  one per cached child linked under it
    pub fn ref_count(&self, r: &BlockRef) -> Option<usize> {
        self.0.table.read().ref_count(r)
    }

    pub fn stats(&self) -> NodeCacheStats {
        let table = self.0.table.read();
        NodeCacheStats {
            entries: table.num_entries(),
            cores: table.num_cores(),
        }
    }
}

impl std::fmt::Debug for NodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeCache")
            .field("folder_branch", &self.0.folder_branch)
            .field("stats", &self.stats())
            .finish()
    }
}
