//! In-memory node and path bookkeeping for one folder-branch
//!
//! - **[`NodeCache`]**: index from object identity ([`BlockRef`](crate::block::BlockRef))
//!   to a single shared node core, with rename, unlink and pointer updates
//! - **[`Node`]**: reference-counted handle to a node core; dropping it
//!   releases the reference
//! - **[`NodeId`]**: stable id of a node core
//!
//! # Architecture
//!
//! ```text
//!   NodeCache ──┐                 Node (handle) ──┐
//!               ▼                                 ▼
//!        RwLock<NodeTable>
//!          nodes: BlockRef ──> (NodeId, ref count)
//!          cores: NodeId   ──> NodeCore { pointer, name, parent: NodeId, cached path }
//! ```
//!
//! Parent links are arena keys, so a rekeyed parent stays reachable from
//!  its children. A child's parent link counts as a reference on the
//!  parent, which keeps every ancestor of a held node in the cache.
//!
//! Once a node is unlinked it keeps the path it had at the time, and
//!  anything below it that is still held resolves its path through that
//!  snapshot.

mod cache;
mod node;
mod table;

pub use cache::{NodeCache, NodeCacheError, NodeCacheStats};
pub use node::Node;
pub use table::NodeId;

#[cfg(test)]
mod test {
    use super::*;
    use crate::block::{BlockId, BlockPointer, BlockRef, RefNonce};
    use crate::folder::TlfId;
    use crate::path::{Path, PathNode};

    fn ptr(seed: &str) -> BlockPointer {
        BlockPointer::new(BlockId::hash(seed.as_bytes()))
    }

    #[test]
    fn test_get_or_create_reuses_entry() {
        let cache = NodeCache::new(TlfId::generate());
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let again = cache.get_or_create(ptr("root"), "root", None).unwrap();

        assert_eq!(root.id(), again.id());
        assert_eq!(cache.ref_count(&ptr("root").block_ref()), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_drop_evicts() {
        let cache = NodeCache::new(TlfId::generate());
        let node = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let clone = node.clone();
        assert_eq!(cache.ref_count(&ptr("root").block_ref()), Some(2));

        drop(node);
        assert_eq!(cache.ref_count(&ptr("root").block_ref()), Some(1));
        drop(clone);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().cores, 0);
    }

    #[test]
    fn test_get_zero_ref() {
        let cache = NodeCache::new(TlfId::generate());
        assert!(cache.get(Default::default()).is_none());
    }

    #[test]
    #[should_panic(expected = "invalid block pointer")]
    fn test_get_or_create_invalid_pointer_panics() {
        let cache = NodeCache::new(TlfId::generate());
        let _ = cache.get_or_create(BlockPointer::default(), "x", None);
    }

    #[test]
    #[should_panic(expected = "invalid new pointer")]
    fn test_update_pointer_invalid_new_pointer_panics() {
        let cache = NodeCache::new(TlfId::generate());
        cache.update_pointer(ptr("a").block_ref(), BlockPointer::default());
    }

    // not the zero sentinel, but no block behind it either
    fn bad_ref() -> BlockRef {
        BlockRef {
            id: BlockId::default(),
            ref_nonce: RefNonce::generate(),
        }
    }

    #[test]
    #[should_panic(expected = "invalid block ref")]
    fn test_get_invalid_ref_panics() {
        let cache = NodeCache::new(TlfId::generate());
        let _ = cache.get(bad_ref());
    }

    #[test]
    #[should_panic(expected = "invalid block ref")]
    fn test_mv_invalid_ref_panics() {
        let cache = NodeCache::new(TlfId::generate());
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let _ = cache.mv(bad_ref(), &root, "x");
    }

    #[test]
    #[should_panic(expected = "invalid block ref")]
    fn test_unlink_invalid_ref_panics() {
        let cache = NodeCache::new(TlfId::generate());
        cache.unlink(bad_ref(), Path::default());
    }

    #[test]
    #[should_panic(expected = "invalid old ref")]
    fn test_update_pointer_invalid_old_ref_panics() {
        let cache = NodeCache::new(TlfId::generate());
        cache.update_pointer(bad_ref(), ptr("a"));
    }

    #[test]
    fn test_ref_count_includes_child_links() {
        let cache = NodeCache::new(TlfId::generate());
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let children = ["a", "b", "c"]
            .iter()
            .map(|name| cache.get_or_create(ptr(name), name, Some(&root)).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(cache.ref_count(&ptr("root").block_ref()), Some(4));
        drop(children);
        assert_eq!(cache.ref_count(&ptr("root").block_ref()), Some(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "under its own descendant")]
    fn test_mv_under_descendant_panics_in_debug() {
        let cache = NodeCache::new(TlfId::generate());
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let a = cache.get_or_create(ptr("a"), "a", Some(&root)).unwrap();
        let b = cache.get_or_create(ptr("b"), "b", Some(&a)).unwrap();
        let _ = cache.mv(ptr("a").block_ref(), &b, "a");
    }

    #[test]
    fn test_update_pointer_both_zero_is_noop() {
        let cache = NodeCache::new(TlfId::generate());
        cache.update_pointer(Default::default(), BlockPointer::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_basename() {
        let cache = NodeCache::new(TlfId::generate());
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let a = cache.get_or_create(ptr("a"), "a", Some(&root)).unwrap();
        assert_eq!(a.basename(), "a");

        let snapshot = cache.path_from_node(&a);
        cache.unlink(ptr("a").block_ref(), snapshot);
        assert_eq!(a.basename(), "");
    }

    #[test]
    fn test_path_carries_folder_branch() {
        let cache = NodeCache::new(TlfId::generate());
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
        let path = cache.path_from_node(&root);
        assert_eq!(&path.folder_branch, cache.folder_branch());
        assert_eq!(path.nodes, vec![PathNode::new(ptr("root"), "root")]);
    }

    #[test]
    fn test_with_config_tags_branch() {
        let config = crate::config::NodeCacheConfig::from_toml_str("branch = \"conflict\"").unwrap();
        let tlf = TlfId::generate();
        let cache = NodeCache::with_config(tlf, config);
        let root = cache.get_or_create(ptr("root"), "root", None).unwrap();

        assert_eq!(root.folder_branch().tlf, tlf);
        assert_eq!(root.folder_branch().branch.as_str(), "conflict");
        assert_eq!(cache.path_from_node(&root).folder_branch, *cache.folder_branch());
    }

    #[test]
    fn test_foreign_handle_gets_empty_path() {
        let cache = NodeCache::new(TlfId::generate());
        let other = NodeCache::new(TlfId::generate());
        let node = other.get_or_create(ptr("root"), "root", None).unwrap();
        assert_eq!(cache.path_from_node(&node), Path::default());
        assert!(!cache.contains(&node));
        assert!(other.contains(&node));
    }
}
