//! Topoforge Types - Core descriptors for deployment topology synthesis
//!
//! A topology is the full description of one deployment: a virtual network,
//! provisioned infrastructure resources (data stores, a message broker, the
//! orchestration cluster), per-service workloads, and a validated dependency
//! graph. The topology is built in a single pass, frozen, and handed as a
//! serializable plan to an external orchestration engine that reconciles it
//! against live state.
//!
//! ## Key Concepts
//!
//! - **Topology**: root aggregate owning every descriptor from one run
//! - **Resource**: non-workload infrastructure (data store, broker, cluster)
//! - **Workload**: a deployable service with container spec and environment
//! - **HealthProbe**: readiness check attached to a resource; dependents
//!   order on readiness, not mere existence
//! - **DependencyGraph**: append-only arena of "must-be-ready-before" edges,
//!   validated acyclic before hand-off
//! - **Secret**: generated credential; only its opaque reference ever enters
//!   an environment mapping or the serialized plan

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod graph;
pub mod ids;
pub mod network;
pub mod probe;
pub mod resource;
pub mod secret;
pub mod topology;
pub mod workload;

// Re-export main types
pub use error::{TopoResult, TopologyError};
pub use graph::{DependencyEdge, DependencyGraph};
pub use ids::NodeId;
pub use network::{Network, Zone, ZoneKind};
pub use probe::{HealthProbe, ProbeProtocol};
pub use resource::{
    BrokerCluster, DataStore, Endpoint, OrchestrationCluster, RemovalPolicy, Resource,
};
pub use secret::{Secret, SecretRef};
pub use topology::Topology;
pub use workload::{
    EnvMap, EnvValue, FrontEnd, LogSink, PortMapping, PortProtocol, TaskSize, Workload,
};
