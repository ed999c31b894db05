/**
 * Content pointers and the identity keys
 *  derived from them.
 */
pub mod block;
/**
 * Configuration for a node cache, loadable
 *  from TOML.
 */
pub mod config;
/**
 * Folder-branch tags: which top-level folder,
 *  on which branch, a cache serves.
 */
pub mod folder;
/**
 * The node cache itself. Maps object identities
 *  to live, reference-counted node handles and
 *  rebuilds full paths from those handles.
 */
pub mod node_cache;
/**
 * Root-to-leaf paths of (pointer, name) pairs.
 */
pub mod path;

pub mod prelude {
    pub use crate::block::{BlockId, BlockPointer, BlockRef, RefNonce};
    pub use crate::config::NodeCacheConfig;
    pub use crate::folder::{BranchName, FolderBranch, TlfId};
    pub use crate::node_cache::{Node, NodeCache, NodeCacheError, NodeId};
    pub use crate::path::{Path, PathNode};
}
