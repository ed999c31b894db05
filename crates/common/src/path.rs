use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::{BlockPointer, BlockRef};
use crate::folder::FolderBranch;

/// One step of a path: an object's current pointer and its name
///  within its parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub pointer: BlockPointer,
    pub name: String,
}

impl PathNode {
    pub fn new(pointer: BlockPointer, name: impl Into<String>) -> Self {
        Self {
            pointer,
            name: name.into(),
        }
    }

    pub fn block_ref(&self) -> BlockRef {
        self.pointer.block_ref()
    }
}

/// A root-to-leaf sequence of path nodes within one folder-branch
///
/// Paths are built fresh by the node cache on every request and are
///  never updated in place; a rename or unlink elsewhere in the tree
///  does not change a path that was already handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub folder_branch: FolderBranch,
    pub nodes: Vec<PathNode>,
}

impl Path {
    pub fn new(folder_branch: FolderBranch, nodes: Vec<PathNode>) -> Self {
        Self {
            folder_branch,
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A path is valid when it is non-empty and every pointer along
    ///  it is well-formed
    pub fn is_valid(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|n| n.pointer.is_valid())
    }

    pub fn has_valid_parent(&self) -> bool {
        self.nodes.len() >= 2 && self.parent_path().is_some_and(|p| p.is_valid())
    }

    pub fn tail(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    pub fn tail_name(&self) -> &str {
        self.tail().map(|n| n.name.as_str()).unwrap_or_default()
    }

    pub fn tail_pointer(&self) -> BlockPointer {
        self.tail().map(|n| n.pointer).unwrap_or_default()
    }

    pub fn tail_ref(&self) -> BlockRef {
        self.tail_pointer().block_ref()
    }

    /// The path of the containing directory, or `None` for the root
    pub fn parent_path(&self) -> Option<Path> {
        if self.nodes.len() <= 1 {
            return None;
        }
        Some(Path {
            folder_branch: self.folder_branch.clone(),
            nodes: self.nodes[..self.nodes.len() - 1].to_vec(),
        })
    }

    pub fn child_path(&self, name: impl Into<String>, pointer: BlockPointer) -> Path {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(PathNode::new(pointer, name));
        Path {
            folder_branch: self.folder_branch.clone(),
            nodes,
        }
    }

    /// Child path for an entry whose block hasn't been written yet
    pub fn child_path_no_ptr(&self, name: impl Into<String>) -> Path {
        self.child_path(name, BlockPointer::default())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .nodes
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>();
        write!(f, "{}", names.join("/"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::block::BlockId;
    use crate::folder::TlfId;

    fn ptr(seed: &str) -> BlockPointer {
        BlockPointer::new(BlockId::hash(seed.as_bytes()))
    }

    fn sample() -> Path {
        let root = Path::new(
            FolderBranch::master(TlfId::generate()),
            vec![PathNode::new(ptr("root"), "")],
        );
        root.child_path("a", ptr("a")).child_path("b", ptr("b"))
    }

    #[test]
    fn test_path_display() {
        assert_eq!(sample().to_string(), "/a/b");
        assert_eq!(Path::default().to_string(), "");
    }

    #[test]
    fn test_tail_accessors() {
        let p = sample();
        assert_eq!(p.tail_name(), "b");
        assert_eq!(p.tail_pointer(), ptr("b"));
        assert_eq!(p.tail_ref(), ptr("b").block_ref());

        let empty = Path::default();
        assert_eq!(empty.tail_name(), "");
        assert!(empty.tail_pointer().is_zero());
    }

    #[test]
    fn test_parent_path() {
        let p = sample();
        let parent = p.parent_path().unwrap();
        assert_eq!(parent.tail_name(), "a");
        assert_eq!(parent.folder_branch, p.folder_branch);
        assert_eq!(parent.parent_path().unwrap().len(), 1);
        assert!(parent.parent_path().unwrap().parent_path().is_none());
    }

    #[test]
    fn test_validity() {
        let p = sample();
        assert!(p.is_valid());
        assert!(p.has_valid_parent());

        let pending = p.child_path_no_ptr("new");
        assert!(!pending.is_valid());
        assert!(pending.has_valid_parent());

        assert!(!Path::default().is_valid());
        let root_only = p.parent_path().unwrap().parent_path().unwrap();
        assert!(!root_only.has_valid_parent());
    }
}
