//! Shared test utilities for node cache integration tests
#![allow(dead_code)]

use ::common::block::{BlockId, BlockPointer};
use ::common::folder::TlfId;
use ::common::node_cache::{Node, NodeCache};
use tracing_subscriber::EnvFilter;

/// Install a subscriber so `RUST_LOG=debug` shows cache activity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Pointer to a block with the given fixture content
pub fn ptr(content: &str) -> BlockPointer {
    BlockPointer::new(BlockId::hash(content.as_bytes()))
}

/// A fresh cache for a new top-level folder
pub fn setup_cache() -> NodeCache {
    init_tracing();
    NodeCache::new(TlfId::generate())
}

/// Build root -> "a" -> "b" and return handles to all three
pub fn setup_chain(cache: &NodeCache) -> (Node, Node, Node) {
    let root = cache.get_or_create(ptr("root"), "root", None).unwrap();
    let a = cache.get_or_create(ptr("a"), "a", Some(&root)).unwrap();
    let b = cache.get_or_create(ptr("b"), "b", Some(&a)).unwrap();
    (root, a, b)
}
