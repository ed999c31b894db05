use std::fmt;
use std::sync::Arc;

use crate::block::{BlockPointer, BlockRef};
use crate::folder::FolderBranch;

use super::cache::Shared;
use super::table::NodeId;

/// A handle to one filesystem object in a [`NodeCache`](super::NodeCache)
///
/// Every live handle is one reference on its cache entry. Cloning a
///  handle takes another reference and dropping it gives one back; the
///  last drop evicts the entry from the cache.
pub struct Node {
    shared: Arc<Shared>,
    id: NodeId,
}

impl Node {
    pub(super) fn new(shared: Arc<Shared>, id: NodeId) -> Self {
        Self { shared, id }
    }

    pub(super) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// Id of the node core behind this handle. Equal for all handles
    ///  to the same object, different once an identity is recreated.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn folder_branch(&self) -> &FolderBranch {
        &self.shared.folder_branch
    }

    /// The object's name within its parent, or empty if it was unlinked
    pub fn basename(&self) -> String {
        let table = self.shared.table.read();
        match table.core(self.id) {
            Some(core) if !core.is_unlinked() => core.path_node.name.clone(),
            _ => String::new(),
        }
    }

    /// The object's current content pointer
    pub fn pointer(&self) -> BlockPointer {
        let table = self.shared.table.read();
        table
            .core(self.id)
            .map(|core| core.path_node.pointer)
            .unwrap_or_default()
    }

    /// The identity this object is currently indexed under
    pub fn block_ref(&self) -> BlockRef {
        self.pointer().block_ref()
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.shared.table.write().acquire(self.id);
        tracing::trace!("Acquired handle to {}", self.id);
        Node {
            shared: self.shared.clone(),
            id: self.id,
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.shared.table.write().forget(self.id);
        tracing::trace!("Released handle to {}", self.id);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) && self.id == other.id
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("folder_branch", &self.shared.folder_branch)
            .finish()
    }
}
