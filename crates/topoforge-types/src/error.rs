//! Error types for topology synthesis

use crate::NodeId;

/// Errors that can occur while building or validating a topology
///
/// All of these are deterministic functions of the input configuration:
/// synthesis performs no I/O, so there is no transient-failure surface and
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("duplicate node: {0}")]
    DuplicateNode(NodeId),

    #[error("duplicate edge: {dependent} -> {prerequisite}")]
    DuplicateEdge {
        dependent: NodeId,
        prerequisite: NodeId,
    },

    #[error("workload '{workload}' declares port {port} more than once")]
    DuplicatePort { workload: String, port: u16 },

    #[error("workload '{0}' declares no ports")]
    NoPorts(String),

    #[error("node {0} is not a data store")]
    NotADataStore(NodeId),

    #[error("data store {0} has no readiness probe attached")]
    MissingProbe(NodeId),

    #[error("dependency cycle: {}", format_cycle(.cycle))]
    Cycle { cycle: Vec<NodeId> },
}

fn format_cycle(cycle: &[NodeId]) -> String {
    let mut path: Vec<&str> = cycle.iter().map(NodeId::as_str).collect();
    if let Some(first) = path.first().copied() {
        path.push(first);
    }
    path.join(" -> ")
}

/// Result type alias for topology operations
pub type TopoResult<T> = Result<T, TopologyError>;
