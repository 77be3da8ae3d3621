//! The single synthesis pass
//!
//! Turns a validated [`SynthConfig`] into a frozen [`Topology`] plus the
//! generated secrets for hand-off to the external secret store. The pass is
//! fail-fast and atomic: any error aborts before a partial topology escapes.
//! The emitted edge set is validated acyclic as the final step.

use crate::builder::TopologyBuilder;
use crate::config::SynthConfig;
use std::collections::BTreeMap;
use topoforge_types::{NodeId, Secret, TopoResult, Topology};
use tracing::{info, instrument};

/// Everything one synthesis run produces
pub struct SynthOutput {
    /// The validated, frozen deployment plan
    pub topology: Topology,
    /// Credentials generated during the pass, for the external secret store;
    /// fresh on every run, never serialized
    pub secrets: Vec<Secret>,
}

/// Drives one synthesis pass over a static configuration
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// Build the full topology: network, stores and probes, broker, cluster,
    /// workloads, gateway, then validate the dependency graph
    #[instrument(skip(self), fields(stack = %self.config.name))]
    pub fn synthesize(&self) -> TopoResult<SynthOutput> {
        let config = &self.config;
        config.validate()?;

        let mut builder = TopologyBuilder::new(&config.name, config.zone_count)?;
        let mut secrets = Vec::new();
        let mut stores: BTreeMap<&str, NodeId> = BTreeMap::new();

        for service in &config.services {
            if service.has_data_store {
                let (store, secret) =
                    builder.provision_data_store(format!("{}-db", service.name), &service.name)?;
                builder.attach_health_probe(&store)?;
                stores.insert(service.name.as_str(), store);
                secrets.push(secret);
            }
        }

        builder.provision_broker(format!("{}-broker", config.name), config.broker_nodes)?;
        builder.build_cluster(
            format!("{}-cluster", config.name),
            config.discovery_namespace.clone(),
        )?;

        for service in &config.services {
            builder.assemble_workload(service, stores.get(service.name.as_str()))?;
        }

        if let Some(gateway) = &config.gateway {
            builder.build_gateway(gateway, &config.addressing)?;
        }

        secrets.extend(builder.take_secrets());
        let topology = builder.finish()?;
        info!(
            resources = topology.resources.len(),
            workloads = topology.workloads.len(),
            edges = topology.graph.edges().len(),
            "topology synthesized"
        );
        Ok(SynthOutput { topology, secrets })
    }
}

/// Convenience entry point: one call, one plan
pub fn synthesize(config: SynthConfig) -> TopoResult<SynthOutput> {
    Synthesizer::new(config).synthesize()
}
