//! Input configuration for a synthesis run
//!
//! The configuration arrives as already-validated structured data; parsing
//! and file handling are the caller's concern. `serde` derives are provided
//! so callers may load it from JSON if they wish.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use topoforge_types::{EnvMap, EnvValue, TaskSize, TopoResult, TopologyError};

/// How workloads and the gateway address each other
///
/// The reference deployment declares a discovery namespace but addresses
/// services by fixed host/port; both behaviors are configuration here, so
/// neither is guessed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    /// Fixed host/port URLs, e.g. `http://host.docker.internal:4005`
    FixedHost { host: String },
    /// Names resolved through the cluster's discovery namespace,
    /// e.g. `http://auth.my-namespace:4005`
    Discovery,
}

impl Default for Addressing {
    fn default() -> Self {
        Addressing::FixedHost {
            host: "host.docker.internal".into(),
        }
    }
}

/// One service to deploy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    /// Container image reference
    pub image: String,
    /// Exposed ports; container == host, TCP
    pub ports: Vec<u16>,
    /// Whether this service owns a relational data store
    #[serde(default)]
    pub has_data_store: bool,
    /// Whether this service consumes the message broker (adds an ordering
    /// edge; the bootstrap address list is in every environment regardless)
    #[serde(default)]
    pub consumes_broker: bool,
    /// Caller-supplied environment overrides; win over derived variables
    #[serde(default)]
    pub extra_env: EnvMap,
    /// Environment key -> secret name; a credential is generated under that
    /// name during synthesis and injected as a secret reference
    #[serde(default)]
    pub secret_env: BTreeMap<String, String>,
    /// Services that must be ready before this one starts; each must be
    /// declared earlier in the service list
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub sizing: TaskSize,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ports,
            has_data_store: false,
            consumes_broker: false,
            extra_env: EnvMap::new(),
            secret_env: BTreeMap::new(),
            depends_on: Vec::new(),
            sizing: TaskSize::default(),
        }
    }

    pub fn with_data_store(mut self) -> Self {
        self.has_data_store = true;
        self
    }

    pub fn with_broker(mut self) -> Self {
        self.consumes_broker = true;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: EnvValue) -> Self {
        self.extra_env.insert(key.into(), value);
        self
    }

    /// Generate a credential under `secret_name` and inject its reference
    /// as `key`
    pub fn with_secret_env(
        mut self,
        key: impl Into<String>,
        secret_name: impl Into<String>,
    ) -> Self {
        self.secret_env.insert(key.into(), secret_name.into());
        self
    }

    /// Require `service` to be ready before this one starts
    pub fn with_dependency(mut self, service: impl Into<String>) -> Self {
        self.depends_on.push(service.into());
        self
    }
}

/// An upstream a gateway routes to
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Upstream {
    /// Name of the target service
    pub service: String,
    pub port: u16,
}

/// The externally reachable entry workload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewaySpec {
    pub name: String,
    pub image: String,
    pub public_port: u16,
    pub upstreams: Vec<Upstream>,
    #[serde(default)]
    pub extra_env: EnvMap,
}

impl GatewaySpec {
    pub fn new(image: impl Into<String>, public_port: u16) -> Self {
        let image = image.into();
        Self {
            name: image.clone(),
            image,
            public_port,
            upstreams: Vec::new(),
            extra_env: EnvMap::new(),
        }
    }

    pub fn with_upstream(mut self, service: impl Into<String>, port: u16) -> Self {
        self.upstreams.push(Upstream {
            service: service.into(),
            port,
        });
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: EnvValue) -> Self {
        self.extra_env.insert(key.into(), value);
        self
    }
}

/// Full input for one synthesis run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Stack name; resource names derive from it
    pub name: String,
    pub zone_count: u32,
    pub broker_nodes: u32,
    /// Declared service-discovery namespace on the cluster; latent capacity
    /// unless `addressing` is `Discovery`
    #[serde(default)]
    pub discovery_namespace: Option<String>,
    #[serde(default)]
    pub addressing: Addressing,
    pub services: Vec<ServiceSpec>,
    #[serde(default)]
    pub gateway: Option<GatewaySpec>,
}

impl SynthConfig {
    pub fn new(name: impl Into<String>, zone_count: u32, broker_nodes: u32) -> Self {
        Self {
            name: name.into(),
            zone_count,
            broker_nodes,
            discovery_namespace: None,
            addressing: Addressing::default(),
            services: Vec::new(),
            gateway: None,
        }
    }

    pub fn with_service(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_gateway(mut self, gateway: GatewaySpec) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_discovery_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.discovery_namespace = Some(namespace.into());
        self
    }

    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    /// Cross-field checks that do not belong to any single builder
    pub fn validate(&self) -> TopoResult<()> {
        let mut names = HashSet::new();
        let mut secret_names = HashSet::new();
        for service in &self.services {
            if service.name.is_empty() {
                return Err(TopologyError::Configuration(
                    "service name cannot be empty".into(),
                ));
            }
            // dependencies must point at services declared earlier, so the
            // synthesis order is also the dependency order
            for dependency in &service.depends_on {
                if !names.contains(dependency.as_str()) {
                    return Err(TopologyError::Configuration(format!(
                        "service '{}' depends on '{}', which is not declared before it",
                        service.name, dependency
                    )));
                }
            }
            for secret_name in service.secret_env.values() {
                if !secret_names.insert(secret_name.as_str()) {
                    return Err(TopologyError::Configuration(format!(
                        "duplicate secret name: '{secret_name}'"
                    )));
                }
            }
            if !names.insert(service.name.as_str()) {
                return Err(TopologyError::Configuration(format!(
                    "duplicate service name: '{}'",
                    service.name
                )));
            }
        }
        if let Some(gateway) = &self.gateway {
            let mut upstreams = HashSet::new();
            for upstream in &gateway.upstreams {
                if !names.contains(upstream.service.as_str()) {
                    return Err(TopologyError::Configuration(format!(
                        "gateway upstream '{}' is not a declared service",
                        upstream.service
                    )));
                }
                if !upstreams.insert(upstream.service.as_str()) {
                    return Err(TopologyError::Configuration(format!(
                        "gateway lists upstream '{}' more than once",
                        upstream.service
                    )));
                }
            }
        }
        if self.addressing == Addressing::Discovery && self.discovery_namespace.is_none() {
            return Err(TopologyError::Configuration(
                "discovery addressing requires a discovery namespace".into(),
            ));
        }
        Ok(())
    }
}
