//! Deployable service workloads
//!
//! A [`Workload`] is one deployable unit: a container spec (image, port
//! mappings, environment, logging sink), a task sizing, and optional bindings
//! to a data store. Port validation lives here because port uniqueness is a
//! property of the descriptor itself, not of how it is assembled.

use crate::{NodeId, SecretRef, TopoResult, TopologyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transport protocol of an exposed port
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortProtocol {
    Tcp,
}

/// One exposed port; container and host ports are identical by convention
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
    pub protocol: PortProtocol,
}

impl PortMapping {
    pub fn tcp(port: u16) -> Self {
        Self {
            container_port: port,
            host_port: port,
            protocol: PortProtocol::Tcp,
        }
    }
}

/// Compute/memory shape of a workload's task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSize {
    pub cpu_units: u32,
    pub memory_mib: u32,
}

impl Default for TaskSize {
    fn default() -> Self {
        Self {
            cpu_units: 256,
            memory_mib: 512,
        }
    }
}

/// An environment-variable value: plain text or an injected secret reference
///
/// Credentials have no plain-text path into a workload environment; they
/// must arrive as a [`SecretRef`] resolved by the external executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvValue {
    Plain(String),
    Secret(SecretRef),
}

impl EnvValue {
    pub fn plain(value: impl Into<String>) -> Self {
        EnvValue::Plain(value.into())
    }
}

/// Environment mapping with deterministic key order
pub type EnvMap = BTreeMap<String, EnvValue>;

/// Logging sink created alongside every workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSink {
    /// Sink name, by convention derived from the image name
    pub name: String,
    pub stream_prefix: String,
    /// Short retention window; these are dev-stack logs
    pub retention_days: u32,
    pub removal_policy: crate::RemovalPolicy,
}

impl LogSink {
    /// Conventional sink for a workload image
    pub fn for_image(image: &str) -> Self {
        Self {
            name: format!("/svc/{image}"),
            stream_prefix: image.to_string(),
            retention_days: 1,
            removal_policy: crate::RemovalPolicy::Destroy,
        }
    }
}

/// One deployable service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    /// Container image reference, resolved by the external registry
    pub image: String,
    pub ports: Vec<PortMapping>,
    pub sizing: TaskSize,
    pub env: EnvMap,
    pub log_sink: LogSink,
    /// Bound data store, if this service owns one
    pub data_store: Option<NodeId>,
    /// Cluster this workload runs on
    pub cluster: NodeId,
    pub assign_public_ip: bool,
    /// Load-distribution front end; only the gateway workload carries one
    pub front_end: Option<FrontEnd>,
}

impl Workload {
    /// Node key for this workload
    pub fn node_id(&self) -> NodeId {
        NodeId::new(&self.name)
    }

    /// Check the declared port set: non-empty, no duplicates
    pub fn validate_ports(name: &str, ports: &[u16]) -> TopoResult<()> {
        if ports.is_empty() {
            return Err(TopologyError::NoPorts(name.to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for &port in ports {
            if !seen.insert(port) {
                return Err(TopologyError::DuplicatePort {
                    workload: name.to_string(),
                    port,
                });
            }
        }
        Ok(())
    }
}

/// The load-distribution front end placed before a gateway workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontEnd {
    /// Externally reachable port
    pub public_port: u16,
    pub desired_count: u32,
    /// Seconds to wait after start before health checks gate traffic
    pub health_check_grace_secs: u32,
}
