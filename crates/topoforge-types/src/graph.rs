//! Append-only dependency graph
//!
//! Nodes are keyed by stable name and stored in an arena; edges are ordered
//! index pairs (dependent -> prerequisite). The graph records and validates
//! ordering constraints, it never schedules execution: the external engine
//! is free to run independent subtrees in parallel as long as every edge is
//! honored.

use crate::{NodeId, TopoResult, TopologyError};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A directed ordering constraint: prerequisite must be ready before
/// dependent starts
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub dependent: NodeId,
    pub prerequisite: NodeId,
}

/// Arena-backed DAG of resources and workloads
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    /// (dependent, prerequisite) index pairs, in insertion order
    edges: Vec<(usize, usize)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node; fails on duplicate names
    pub fn add_node(&mut self, id: NodeId) -> TopoResult<()> {
        if self.index.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(id);
        Ok(())
    }

    /// Record that `dependent` must not start before `prerequisite` is ready
    ///
    /// Both nodes must already be registered; referencing an unknown node is
    /// a dependency error, never silently skipped.
    pub fn add_edge(&mut self, dependent: &NodeId, prerequisite: &NodeId) -> TopoResult<()> {
        let dep = self.lookup(dependent)?;
        let pre = self.lookup(prerequisite)?;
        if self.edges.contains(&(dep, pre)) {
            return Err(TopologyError::DuplicateEdge {
                dependent: dependent.clone(),
                prerequisite: prerequisite.clone(),
            });
        }
        self.edges.push((dep, pre));
        Ok(())
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn has_edge(&self, dependent: &NodeId, prerequisite: &NodeId) -> bool {
        match (self.index.get(dependent), self.index.get(prerequisite)) {
            (Some(&dep), Some(&pre)) => self.edges.contains(&(dep, pre)),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Edges with resolved names, in insertion order
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.edges
            .iter()
            .map(|&(dep, pre)| DependencyEdge {
                dependent: self.nodes[dep].clone(),
                prerequisite: self.nodes[pre].clone(),
            })
            .collect()
    }

    /// Prerequisites of a node, in insertion order
    pub fn prerequisites(&self, dependent: &NodeId) -> Vec<NodeId> {
        match self.index.get(dependent) {
            Some(&dep) => self
                .edges
                .iter()
                .filter(|&&(d, _)| d == dep)
                .map(|&(_, pre)| self.nodes[pre].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Check that the edge set is acyclic
    ///
    /// On failure the error carries the member nodes of one offending cycle,
    /// in dependency order, so the caller can see which declarations are
    /// inverted or circular.
    pub fn validate(&self) -> TopoResult<()> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for &(dep, pre) in &self.edges {
            adjacency[dep].push(pre);
        }

        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.nodes.len()];
        let mut path = Vec::new();
        for start in 0..self.nodes.len() {
            if state[start] == 0 {
                if let Some(cycle) = self.visit(start, &adjacency, &mut state, &mut path) {
                    return Err(TopologyError::Cycle { cycle });
                }
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        node: usize,
        adjacency: &[Vec<usize>],
        state: &mut [u8],
        path: &mut Vec<usize>,
    ) -> Option<Vec<NodeId>> {
        state[node] = 1;
        path.push(node);
        for &next in &adjacency[node] {
            match state[next] {
                0 => {
                    if let Some(cycle) = self.visit(next, adjacency, state, path) {
                        return Some(cycle);
                    }
                }
                1 => {
                    let from = path.iter().position(|&n| n == next).unwrap_or(0);
                    return Some(path[from..].iter().map(|&n| self.nodes[n].clone()).collect());
                }
                _ => {}
            }
        }
        path.pop();
        state[node] = 2;
        None
    }

    fn lookup(&self, id: &NodeId) -> TopoResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TopologyError::UnknownNode(id.clone()))
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DependencyGraph", 2)?;
        s.serialize_field("nodes", &self.nodes)?;
        s.serialize_field("edges", &self.edges())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn graph_with(nodes: &[&str]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for n in nodes {
            g.add_node(NodeId::new(*n)).unwrap();
        }
        g
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = graph_with(&["a"]);
        assert!(matches!(
            g.add_node(NodeId::new("a")),
            Err(TopologyError::DuplicateNode(_))
        ));
    }

    #[test]
    fn edge_to_unknown_node_rejected() {
        let mut g = graph_with(&["a"]);
        let err = g.add_edge(&NodeId::new("a"), &NodeId::new("ghost")).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownNode(id) if id.as_str() == "ghost"));
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(&NodeId::new("a"), &NodeId::new("b")).unwrap();
        assert!(matches!(
            g.add_edge(&NodeId::new("a"), &NodeId::new("b")),
            Err(TopologyError::DuplicateEdge { .. })
        ));
    }

    #[test]
    fn chain_validates() {
        let mut g = graph_with(&["a", "b", "c"]);
        g.add_edge(&NodeId::new("a"), &NodeId::new("b")).unwrap();
        g.add_edge(&NodeId::new("b"), &NodeId::new("c")).unwrap();
        assert!(g.validate().is_ok());
    }

    #[test]
    fn self_edge_reports_cycle() {
        let mut g = graph_with(&["a"]);
        g.add_edge(&NodeId::new("a"), &NodeId::new("a")).unwrap();
        let err = g.validate().unwrap_err();
        assert!(matches!(err, TopologyError::Cycle { ref cycle } if cycle.len() == 1));
    }

    #[test]
    fn cycle_reports_members() {
        let mut g = graph_with(&["a", "b", "c", "d"]);
        g.add_edge(&NodeId::new("a"), &NodeId::new("b")).unwrap();
        g.add_edge(&NodeId::new("b"), &NodeId::new("c")).unwrap();
        g.add_edge(&NodeId::new("c"), &NodeId::new("b")).unwrap();
        g.add_edge(&NodeId::new("a"), &NodeId::new("d")).unwrap();
        match g.validate().unwrap_err() {
            TopologyError::Cycle { cycle } => {
                let names: Vec<&str> = cycle.iter().map(NodeId::as_str).collect();
                assert_eq!(names, vec!["b", "c"]);
            }
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn prerequisites_in_order() {
        let mut g = graph_with(&["w", "db", "probe"]);
        g.add_edge(&NodeId::new("w"), &NodeId::new("db")).unwrap();
        g.add_edge(&NodeId::new("w"), &NodeId::new("probe")).unwrap();
        let pres: Vec<String> = g
            .prerequisites(&NodeId::new("w"))
            .into_iter()
            .map(|n| n.0)
            .collect();
        assert_eq!(pres, vec!["db", "probe"]);
    }

    #[test]
    fn serializes_named_edges() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(&NodeId::new("a"), &NodeId::new("b")).unwrap();
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["edges"][0]["dependent"], "a");
        assert_eq!(json["edges"][0]["prerequisite"], "b");
    }

    proptest! {
        // Edges that only point from a lower index to a higher one can
        // never form a cycle, whatever the configuration generates.
        #[test]
        fn forward_edges_never_cycle(
            n in 2usize..32,
            raw in prop::collection::vec((0usize..32, 0usize..32), 0..64),
        ) {
            let mut g = DependencyGraph::new();
            let ids: Vec<NodeId> = (0..n).map(|i| NodeId::new(format!("n{i}"))).collect();
            for id in &ids {
                g.add_node(id.clone()).unwrap();
            }
            for (a, b) in raw {
                let (a, b) = (a % n, b % n);
                if a < b && !g.has_edge(&ids[a], &ids[b]) {
                    g.add_edge(&ids[a], &ids[b]).unwrap();
                }
            }
            prop_assert!(g.validate().is_ok());
        }
    }
}
