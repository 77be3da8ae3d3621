//! The topology aggregate
//!
//! A [`Topology`] owns everything created within one synthesis pass: the
//! network, every resource and workload descriptor, the probes, and the
//! dependency graph. Insertion registers the node in the graph; edges are
//! added explicitly by the producer in the same call that creates the node,
//! never inferred later. Once synthesis completes the aggregate is treated
//! as immutable and is safe for concurrent read.

use crate::{
    DataStore, DependencyGraph, HealthProbe, Network, NodeId, Resource, TopoResult,
    TopologyError, Workload,
};
use serde::Serialize;

/// The full synthesized deployment graph: resources + workloads + edges
#[derive(Clone, Debug, Serialize)]
pub struct Topology {
    pub name: String,
    pub network: Network,
    pub resources: Vec<Resource>,
    pub probes: Vec<HealthProbe>,
    pub workloads: Vec<Workload>,
    pub graph: DependencyGraph,
}

impl Topology {
    /// Start a topology around an already-built network
    pub fn new(name: impl Into<String>, network: Network) -> TopoResult<Self> {
        let mut graph = DependencyGraph::new();
        graph.add_node(network.node_id())?;
        Ok(Self {
            name: name.into(),
            network,
            resources: Vec::new(),
            probes: Vec::new(),
            workloads: Vec::new(),
            graph,
        })
    }

    /// Add a resource, registering its graph node
    pub fn add_resource(&mut self, resource: Resource) -> TopoResult<NodeId> {
        let id = resource.node_id();
        self.graph.add_node(id.clone())?;
        self.resources.push(resource);
        Ok(id)
    }

    /// Attach a probe; its target must already exist in the topology
    pub fn add_probe(&mut self, probe: HealthProbe) -> TopoResult<NodeId> {
        if !self.graph.contains(&probe.target) {
            return Err(TopologyError::UnknownNode(probe.target.clone()));
        }
        let id = probe.node_id();
        self.graph.add_node(id.clone())?;
        self.graph.add_edge(&id, &probe.target)?;
        self.probes.push(probe);
        Ok(id)
    }

    /// Add a workload, registering its graph node
    pub fn add_workload(&mut self, workload: Workload) -> TopoResult<NodeId> {
        let id = workload.node_id();
        self.graph.add_node(id.clone())?;
        self.workloads.push(workload);
        Ok(id)
    }

    /// Record an ordering constraint between two existing nodes
    pub fn add_edge(&mut self, dependent: &NodeId, prerequisite: &NodeId) -> TopoResult<()> {
        self.graph.add_edge(dependent, prerequisite)
    }

    /// Look up a data store by node id
    pub fn data_store(&self, id: &NodeId) -> Option<&DataStore> {
        self.resources
            .iter()
            .filter_map(Resource::as_data_store)
            .find(|ds| &ds.node_id() == id)
    }

    /// Probe attached to a given resource, if any
    pub fn probe_for(&self, target: &NodeId) -> Option<&HealthProbe> {
        self.probes.iter().find(|p| &p.target == target)
    }

    /// Look up a workload by name
    pub fn workload(&self, name: &str) -> Option<&Workload> {
        self.workloads.iter().find(|w| w.name == name)
    }

    /// Check the recorded edge set for cycles
    pub fn validate(&self) -> TopoResult<()> {
        self.graph.validate()
    }
}
