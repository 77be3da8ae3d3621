//! Stable identifiers for topology nodes
//!
//! Every resource and workload is keyed by a name-derived `NodeId`, not a
//! random id: two synthesis runs over the same configuration must produce
//! structurally identical plans.

use serde::{Deserialize, Serialize};

/// Stable key for a node in the dependency graph
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a NodeId from a known name
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
