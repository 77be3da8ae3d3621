//! Provisioned infrastructure resources
//!
//! A [`Resource`] is a non-workload infrastructure unit: a relational data
//! store, a clustered message broker, or the orchestration cluster that hosts
//! workloads. Each carries a unique name, a placement reference into the
//! network, and sizing attributes. Resources are created once per synthesis
//! pass and are immutable thereafter; destruction policy is carried as data
//! for the external executor, never enacted here.

use crate::{NodeId, SecretRef};
use serde::{Deserialize, Serialize};

/// What the executor should do with a resource when the plan is removed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Keep the resource alive after plan removal
    #[default]
    Retain,
    /// Destroy on plan removal; suited to dev/ephemeral stacks
    Destroy,
}

/// Network endpoint of a provisioned resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

/// A relational store owned by exactly one service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataStore {
    pub name: String,
    /// Service that owns this store
    pub owner: String,
    pub network: NodeId,
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub allocated_storage_gib: u32,
    /// Database created inside the store
    pub database_name: String,
    pub endpoint: Endpoint,
    pub master_username: String,
    /// Reference to the generated master credential
    pub password: SecretRef,
    pub removal_policy: RemovalPolicy,
}

impl DataStore {
    pub fn node_id(&self) -> NodeId {
        NodeId::new(&self.name)
    }
}

/// A clustered message broker bound to the network's private zones
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrokerCluster {
    pub name: String,
    pub network: NodeId,
    pub engine_version: String,
    pub instance_class: String,
    pub broker_nodes: u32,
    /// Private zone indices the broker nodes are spread across
    pub client_zones: Vec<u32>,
    /// Connection endpoints, one per broker node
    pub bootstrap_endpoints: Vec<Endpoint>,
}

impl BrokerCluster {
    pub fn node_id(&self) -> NodeId {
        NodeId::new(&self.name)
    }

    /// Comma-joined bootstrap address list as consumed by clients
    pub fn bootstrap_servers(&self) -> String {
        self.bootstrap_endpoints
            .iter()
            .map(|e| format!("{}:{}", e.address, e.port))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The workload-hosting cluster
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrchestrationCluster {
    pub name: String,
    pub network: NodeId,
    /// Internal service-discovery namespace, declared capacity only in the
    /// reference deployment (workloads address each other by fixed host/port)
    pub discovery_namespace: Option<String>,
}

impl OrchestrationCluster {
    pub fn node_id(&self) -> NodeId {
        NodeId::new(&self.name)
    }
}

/// A provisioned infrastructure unit
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    DataStore(DataStore),
    BrokerCluster(BrokerCluster),
    OrchestrationCluster(OrchestrationCluster),
}

impl Resource {
    /// Node key for this resource
    pub fn node_id(&self) -> NodeId {
        match self {
            Resource::DataStore(ds) => ds.node_id(),
            Resource::BrokerCluster(b) => b.node_id(),
            Resource::OrchestrationCluster(c) => c.node_id(),
        }
    }

    /// Placement reference into the network
    pub fn network(&self) -> &NodeId {
        match self {
            Resource::DataStore(ds) => &ds.network,
            Resource::BrokerCluster(b) => &b.network,
            Resource::OrchestrationCluster(c) => &c.network,
        }
    }

    pub fn as_data_store(&self) -> Option<&DataStore> {
        match self {
            Resource::DataStore(ds) => Some(ds),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_servers_join() {
        let broker = BrokerCluster {
            name: "events".into(),
            network: NodeId::new("net"),
            engine_version: "2.8.0".into(),
            instance_class: "kafka.m5.xlarge".into(),
            broker_nodes: 2,
            client_zones: vec![1],
            bootstrap_endpoints: vec![
                Endpoint::new("b-0.events.broker.internal", 9092),
                Endpoint::new("b-1.events.broker.internal", 9092),
            ],
        };
        assert_eq!(
            broker.bootstrap_servers(),
            "b-0.events.broker.internal:9092,b-1.events.broker.internal:9092"
        );
    }
}
