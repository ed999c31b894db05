use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a top-level folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TlfId(Uuid);

impl TlfId {
    pub fn generate() -> Self {
        TlfId(Uuid::new_v4())
    }
}

impl From<Uuid> for TlfId {
    fn from(id: Uuid) -> Self {
        TlfId(id)
    }
}

impl fmt::Display for TlfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a branch of a top-level folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    pub const MASTER: &'static str = "master";

    pub fn new(name: impl Into<String>) -> Self {
        BranchName(name.into())
    }

    /// The default branch every folder starts out on
    pub fn master() -> Self {
        BranchName(Self::MASTER.to_string())
    }

    pub fn is_master(&self) -> bool {
        self.0 == Self::MASTER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self::master()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names one versioned tree: a top-level folder on a given branch.
///
/// Each folder-branch is served by its own node cache, and every path
///  the cache reconstructs is tagged with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderBranch {
    pub tlf: TlfId,
    pub branch: BranchName,
}

impl FolderBranch {
    pub fn new(tlf: TlfId, branch: BranchName) -> Self {
        Self { tlf, branch }
    }

    /// The master branch of `tlf`
    pub fn master(tlf: TlfId) -> Self {
        Self::new(tlf, BranchName::master())
    }
}

impl fmt::Display for FolderBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.tlf, self.branch)
    }
}
