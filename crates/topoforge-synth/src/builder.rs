//! Topology builder - the per-resource provisioning contracts
//!
//! Each method declares one resource or workload, registers its graph node,
//! and emits the ordering edges that resource genuinely requires, all in the
//! same call. Nothing is left to be inferred later.

use crate::config::{Addressing, GatewaySpec, ServiceSpec};
use crate::template;
use tracing::{debug, info, warn};

use topoforge_types::{
    BrokerCluster, DataStore, Endpoint, EnvMap, EnvValue, FrontEnd, HealthProbe, LogSink,
    Network, NodeId, OrchestrationCluster, PortMapping, RemovalPolicy, Resource, Secret,
    TaskSize, TopoResult, Topology, TopologyError, Workload,
};

const DATA_STORE_PORT: u16 = 5432;
const BROKER_CLIENT_PORT: u16 = 9092;
const GATEWAY_GRACE_SECS: u32 = 60;
const GATEWAY_DESIRED_COUNT: u32 = 1;

/// Builds one topology in a single pass
///
/// The builder owns the in-progress [`Topology`]; callers hold `NodeId`
/// handles, never live references into it. [`TopologyBuilder::finish`]
/// validates the edge set and freezes the result.
pub struct TopologyBuilder {
    topology: Topology,
    broker: Option<NodeId>,
    cluster: Option<NodeId>,
    discovery_namespace: Option<String>,
    /// Baseline environment shared by every workload
    env_template: EnvMap,
    /// Credentials minted while assembling workloads, pending hand-off
    minted_secrets: Vec<Secret>,
}

impl TopologyBuilder {
    /// Start a topology on a fresh network with `zone_count` isolation zones
    pub fn new(stack: &str, zone_count: u32) -> TopoResult<Self> {
        let network = Network::build(format!("{stack}-network"), zone_count)?;
        debug!(network = %network.name, zones = zone_count, "network built");
        Ok(Self {
            topology: Topology::new(stack, network)?,
            broker: None,
            cluster: None,
            discovery_namespace: None,
            env_template: EnvMap::new(),
            minted_secrets: Vec::new(),
        })
    }

    /// Declare a relational store owned by `owner`, with a generated
    /// credential
    ///
    /// The credential is returned exactly once, for hand-off to the external
    /// secret store; only its reference stays in the topology.
    pub fn provision_data_store(
        &mut self,
        name: impl Into<String>,
        owner: &str,
    ) -> TopoResult<(NodeId, Secret)> {
        let name = name.into();
        let secret = Secret::generate(&name, "password");
        let network = self.topology.network.node_id();
        let store = DataStore {
            endpoint: Endpoint::new(format!("{name}.db.internal"), DATA_STORE_PORT),
            name,
            owner: owner.to_string(),
            network: network.clone(),
            engine: "postgres".into(),
            engine_version: "17.2".into(),
            instance_class: "db.t2.micro".into(),
            allocated_storage_gib: 20,
            database_name: format!("{owner}-db"),
            master_username: "admin_user".into(),
            password: secret.reference(),
            removal_policy: RemovalPolicy::Destroy,
        };
        let id = self.topology.add_resource(Resource::DataStore(store))?;
        self.topology.add_edge(&id, &network)?;
        info!(store = %id, owner, "data store provisioned");
        Ok((id, secret))
    }

    /// Attach a readiness probe to an already-provisioned data store
    pub fn attach_health_probe(&mut self, store: &NodeId) -> TopoResult<NodeId> {
        let probe = match self.topology.data_store(store) {
            Some(ds) => HealthProbe::for_data_store(ds),
            None if self.topology.graph.contains(store) => {
                return Err(TopologyError::NotADataStore(store.clone()))
            }
            None => return Err(TopologyError::UnknownNode(store.clone())),
        };
        let id = self.topology.add_probe(probe)?;
        debug!(probe = %id, target = %store, "health probe attached");
        Ok(id)
    }

    /// Declare the clustered message broker on the network's private zones
    pub fn provision_broker(
        &mut self,
        name: impl Into<String>,
        broker_nodes: u32,
    ) -> TopoResult<NodeId> {
        let name = name.into();
        if broker_nodes == 0 {
            return Err(TopologyError::Configuration(
                "broker must have at least one node".into(),
            ));
        }
        if broker_nodes == 1 {
            warn!(broker = %name, "single-node broker; two or more recommended for availability");
        }
        let client_zones = self.topology.network.private_zones();
        if client_zones.is_empty() {
            return Err(TopologyError::Configuration(
                "broker requires at least one private zone".into(),
            ));
        }
        let bootstrap_endpoints = (0..broker_nodes)
            .map(|i| Endpoint::new(format!("b-{i}.{name}.broker.internal"), BROKER_CLIENT_PORT))
            .collect();
        let broker = BrokerCluster {
            network: self.topology.network.node_id(),
            engine_version: "2.8.0".into(),
            instance_class: "kafka.m5.xlarge".into(),
            broker_nodes,
            client_zones,
            bootstrap_endpoints,
            name,
        };
        self.env_template = template::base_template(&broker);
        let network = broker.network.clone();
        let id = self.topology.add_resource(Resource::BrokerCluster(broker))?;
        self.topology.add_edge(&id, &network)?;
        info!(broker = %id, nodes = broker_nodes, "broker cluster provisioned");
        self.broker = Some(id.clone());
        Ok(id)
    }

    /// Declare the workload-hosting cluster and its discovery namespace
    pub fn build_cluster(
        &mut self,
        name: impl Into<String>,
        discovery_namespace: Option<String>,
    ) -> TopoResult<NodeId> {
        let cluster = OrchestrationCluster {
            name: name.into(),
            network: self.topology.network.node_id(),
            discovery_namespace: discovery_namespace.clone(),
        };
        let network = cluster.network.clone();
        let id = self
            .topology
            .add_resource(Resource::OrchestrationCluster(cluster))?;
        self.topology.add_edge(&id, &network)?;
        info!(cluster = %id, namespace = ?discovery_namespace, "orchestration cluster built");
        self.cluster = Some(id.clone());
        self.discovery_namespace = discovery_namespace;
        Ok(id)
    }

    /// Assemble one service workload and register it on the cluster
    ///
    /// The cluster and broker must already exist: every workload shares the
    /// broker bootstrap template, and a bound data store must carry its
    /// readiness probe before a workload may order on it.
    ///
    /// Environment merge order: shared template, then data-store-derived
    /// variables, then caller extras, then generated secret references;
    /// later sources win on key collision.
    pub fn assemble_workload(
        &mut self,
        spec: &ServiceSpec,
        data_store: Option<&NodeId>,
    ) -> TopoResult<NodeId> {
        let cluster = self.require_cluster()?;
        let broker = self.require_broker()?;
        Workload::validate_ports(&spec.name, &spec.ports)?;

        let mut env = self.env_template.clone();
        let mut probe_id = None;
        if let Some(store_id) = data_store {
            let store = self
                .topology
                .data_store(store_id)
                .ok_or_else(|| TopologyError::UnknownNode(store_id.clone()))?;
            env.extend(template::data_store_env(store));
            // readiness, not mere existence, is the real precondition
            let probe = self
                .topology
                .probe_for(store_id)
                .ok_or_else(|| TopologyError::MissingProbe(store_id.clone()))?;
            probe_id = Some(probe.node_id());
        }
        env.extend(spec.extra_env.clone());

        let mut minted = Vec::with_capacity(spec.secret_env.len());
        for (key, secret_name) in &spec.secret_env {
            let secret = Secret::generate(secret_name, "value");
            env.insert(key.clone(), EnvValue::Secret(secret.reference()));
            minted.push(secret);
        }

        let mut dependencies = Vec::with_capacity(spec.depends_on.len());
        for dependency in &spec.depends_on {
            let upstream = self
                .topology
                .workload(dependency)
                .ok_or_else(|| TopologyError::UnknownNode(NodeId::new(dependency)))?;
            dependencies.push(upstream.node_id());
        }

        let workload = Workload {
            name: spec.name.clone(),
            image: spec.image.clone(),
            ports: spec.ports.iter().copied().map(PortMapping::tcp).collect(),
            sizing: spec.sizing,
            env,
            log_sink: LogSink::for_image(&spec.image),
            data_store: data_store.cloned(),
            cluster: cluster.clone(),
            assign_public_ip: false,
            front_end: None,
        };
        let id = self.topology.add_workload(workload)?;
        self.topology.add_edge(&id, &cluster)?;

        if let (Some(store_id), Some(probe_id)) = (data_store, &probe_id) {
            self.topology.add_edge(&id, store_id)?;
            self.topology.add_edge(&id, probe_id)?;
        }
        if spec.consumes_broker {
            self.topology.add_edge(&id, &broker)?;
        }
        for dependency in &dependencies {
            self.topology.add_edge(&id, dependency)?;
        }
        self.minted_secrets.extend(minted);
        info!(workload = %id, image = %spec.image, "workload assembled");
        Ok(id)
    }

    /// Declare the public entry workload and its load-distribution front end
    pub fn build_gateway(
        &mut self,
        spec: &GatewaySpec,
        addressing: &Addressing,
    ) -> TopoResult<NodeId> {
        let cluster = self.require_cluster()?;
        Workload::validate_ports(&spec.name, &[spec.public_port])?;

        let mut env = EnvMap::new();
        let mut upstream_ids = Vec::with_capacity(spec.upstreams.len());
        for upstream in &spec.upstreams {
            let workload = self
                .topology
                .workload(&upstream.service)
                .ok_or_else(|| TopologyError::UnknownNode(NodeId::new(&upstream.service)))?;
            upstream_ids.push(workload.node_id());
            env.insert(
                template::upstream_env_key(&upstream.service),
                EnvValue::plain(template::upstream_url(
                    addressing,
                    self.discovery_namespace.as_deref(),
                    &upstream.service,
                    upstream.port,
                )),
            );
        }
        env.extend(spec.extra_env.clone());

        let gateway = Workload {
            name: spec.name.clone(),
            image: spec.image.clone(),
            ports: vec![PortMapping::tcp(spec.public_port)],
            sizing: TaskSize::default(),
            env,
            log_sink: LogSink::for_image(&spec.image),
            data_store: None,
            cluster: cluster.clone(),
            assign_public_ip: true,
            front_end: Some(FrontEnd {
                public_port: spec.public_port,
                desired_count: GATEWAY_DESIRED_COUNT,
                health_check_grace_secs: GATEWAY_GRACE_SECS,
            }),
        };
        let id = self.topology.add_workload(gateway)?;
        self.topology.add_edge(&id, &cluster)?;
        for upstream in &upstream_ids {
            self.topology.add_edge(&id, upstream)?;
        }
        info!(gateway = %id, upstreams = upstream_ids.len(), "gateway built");
        Ok(id)
    }

    /// Validate the edge set and freeze the topology
    pub fn finish(self) -> TopoResult<Topology> {
        self.topology.validate()?;
        Ok(self.topology)
    }

    /// Read access to the in-progress topology, mainly for tests
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Drain the credentials minted while assembling workloads, for
    /// hand-off to the external secret store
    pub fn take_secrets(&mut self) -> Vec<Secret> {
        std::mem::take(&mut self.minted_secrets)
    }

    fn require_cluster(&self) -> TopoResult<NodeId> {
        self.cluster.clone().ok_or_else(|| {
            TopologyError::Configuration(
                "orchestration cluster must be built before workloads".into(),
            )
        })
    }

    fn require_broker(&self) -> TopoResult<NodeId> {
        self.broker.clone().ok_or_else(|| {
            TopologyError::Configuration(
                "broker must be provisioned before workloads are assembled".into(),
            )
        })
    }
}
