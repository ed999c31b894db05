use serde::Deserialize;

use crate::folder::BranchName;

/// Configuration for a node cache
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeCacheConfig {
    /// number of identities to reserve room for up front,
    ///  the index grows past this as needed
    pub initial_capacity: usize,
    /// branch of the folder this cache serves.
    ///  if not set then the master branch is used
    pub branch: BranchName,
}

impl Default for NodeCacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            branch: BranchName::master(),
        }
    }
}

impl NodeCacheConfig {
    /// Parse a config from a TOML document. Missing keys fall back
    ///  to their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid node cache config: {0}")]
    Toml(#[from] toml::de::Error),
}
