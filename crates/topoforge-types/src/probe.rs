//! Readiness probes attached to provisioned resources
//!
//! A probe's target address and port are copied from the resource endpoint
//! at build time, so the probe descriptor stands alone when handed to the
//! external health-check subsystem. Readiness, not mere existence, is the
//! real precondition for dependents: workloads bound to a data store take a
//! dependency edge on the probe.

use crate::{DataStore, NodeId};
use serde::{Deserialize, Serialize};

/// Probe protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeProtocol {
    Tcp,
}

/// A readiness check against a resource endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthProbe {
    pub name: String,
    /// Resource whose readiness this probe reports
    pub target: NodeId,
    pub protocol: ProbeProtocol,
    pub address: String,
    pub port: u16,
    /// Seconds between checks
    pub request_interval_secs: u32,
    /// Consecutive failures before the target is considered down
    pub failure_threshold: u32,
}

impl HealthProbe {
    /// Derive a TCP probe from a data store's endpoint
    pub fn for_data_store(store: &DataStore) -> Self {
        Self {
            name: format!("{}-health", store.name),
            target: store.node_id(),
            protocol: ProbeProtocol::Tcp,
            address: store.endpoint.address.clone(),
            port: store.endpoint.port,
            request_interval_secs: 30,
            failure_threshold: 3,
        }
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::new(&self.name)
    }
}
