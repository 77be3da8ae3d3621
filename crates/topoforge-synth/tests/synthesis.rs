//! End-to-end synthesis scenarios

use topoforge_synth::{
    synthesize, Addressing, GatewaySpec, ServiceSpec, SynthConfig, TopologyError,
};
use topoforge_types::{EnvValue, NodeId, Resource};

fn reference_config() -> SynthConfig {
    SynthConfig::new("stack", 2, 2)
        .with_service(ServiceSpec::new("auth", "auth-service", vec![4005]).with_data_store())
        .with_service(ServiceSpec::new("billing", "billing-service", vec![4001, 9001]))
}

#[test]
fn two_service_scenario() {
    let output = synthesize(reference_config()).unwrap();
    let topo = &output.topology;

    assert_eq!(topo.workloads.len(), 2);
    let stores: Vec<_> = topo
        .resources
        .iter()
        .filter_map(Resource::as_data_store)
        .collect();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].name, "auth-db");
    assert_eq!(topo.probes.len(), 1);

    // auth orders on its store's readiness probe
    assert!(topo
        .graph
        .has_edge(&NodeId::new("auth"), &NodeId::new("auth-db-health")));

    // nothing orders billing on any data store
    let billing_prereqs = topo.graph.prerequisites(&NodeId::new("billing"));
    assert_eq!(billing_prereqs, vec![NodeId::new("stack-cluster")]);

    assert!(topo.validate().is_ok());
}

#[test]
fn bound_workload_env_has_connection_keys() {
    let output = synthesize(reference_config()).unwrap();
    let auth = output.topology.workload("auth").unwrap();

    let url = auth.env.get("SPRING_DATASOURCE_URL").unwrap();
    assert_eq!(
        url,
        &EnvValue::plain("jdbc:postgresql://auth-db.db.internal:5432/auth-db")
    );
    assert_eq!(
        auth.env.get("SPRING_DATASOURCE_USERNAME"),
        Some(&EnvValue::plain("admin_user"))
    );
    match auth.env.get("SPRING_DATASOURCE_PASSWORD") {
        Some(EnvValue::Secret(reference)) => {
            assert_eq!(reference.as_str(), "secret://auth-db/password");
        }
        other => panic!("password must be a secret reference, got {other:?}"),
    }

    // the unbound workload only carries the shared template
    let billing = output.topology.workload("billing").unwrap();
    assert!(!billing.env.contains_key("SPRING_DATASOURCE_URL"));
    assert!(billing.env.contains_key("SPRING_KAFKA_BOOTSTRAP_SERVERS"));
}

#[test]
fn gateway_scenario() {
    let config = reference_config()
        .with_gateway(GatewaySpec::new("api-gateway", 4004).with_upstream("auth", 4005));
    let output = synthesize(config).unwrap();
    let topo = &output.topology;

    let gw = NodeId::new("api-gateway");
    assert!(topo.graph.has_edge(&gw, &NodeId::new("auth")));
    assert!(topo.graph.has_edge(&gw, &NodeId::new("stack-cluster")));

    // every addressed upstream must be a recorded prerequisite
    let gateway = topo.workload("api-gateway").unwrap();
    let prereqs = topo.graph.prerequisites(&gw);
    assert!(gateway.env.contains_key("AUTH_SERVICE_URL"));
    assert!(prereqs.contains(&NodeId::new("auth")));
}

#[test]
fn discovery_addressing_builds_namespace_urls() {
    let config = reference_config()
        .with_discovery_namespace("stack-local")
        .with_addressing(Addressing::Discovery)
        .with_gateway(GatewaySpec::new("api-gateway", 4004).with_upstream("auth", 4005));
    let output = synthesize(config).unwrap();
    let gateway = output.topology.workload("api-gateway").unwrap();
    assert_eq!(
        gateway.env.get("AUTH_SERVICE_URL"),
        Some(&EnvValue::plain("http://auth.stack-local:4005"))
    );
}

#[test]
fn declared_dependency_becomes_an_edge() {
    let config = reference_config().with_service(
        ServiceSpec::new("patient", "patient-service", vec![4000]).with_dependency("billing"),
    );
    let output = synthesize(config).unwrap();
    let topo = &output.topology;

    assert!(topo
        .graph
        .has_edge(&NodeId::new("patient"), &NodeId::new("billing")));
    // the declared dependency adds to, not replaces, the cluster ordering
    let prereqs = topo.graph.prerequisites(&NodeId::new("patient"));
    assert!(prereqs.contains(&NodeId::new("stack-cluster")));
    assert!(topo.validate().is_ok());
}

#[test]
fn service_secret_collected_but_never_serialized() {
    let config = SynthConfig::new("stack", 2, 2).with_service(
        ServiceSpec::new("auth", "auth-service", vec![4005])
            .with_secret_env("JWT_SECRET", "auth-jwt"),
    );
    let output = synthesize(config).unwrap();

    let auth = output.topology.workload("auth").unwrap();
    match auth.env.get("JWT_SECRET") {
        Some(EnvValue::Secret(reference)) => {
            assert_eq!(reference.as_str(), "secret://auth-jwt/value");
        }
        other => panic!("expected a secret reference, got {other:?}"),
    }

    let jwt = output
        .secrets
        .iter()
        .find(|s| s.name() == "auth-jwt")
        .expect("generated credential handed off with the plan");
    let rendered = serde_json::to_value(&output.topology).unwrap().to_string();
    assert!(rendered.contains("secret://auth-jwt/value"));
    assert!(!rendered.contains(jwt.expose_value()));
}

#[test]
fn synthesis_is_idempotent_modulo_secrets() {
    let a = synthesize(reference_config()).unwrap();
    let b = synthesize(reference_config()).unwrap();

    let plan_a = serde_json::to_value(&a.topology).unwrap();
    let plan_b = serde_json::to_value(&b.topology).unwrap();
    assert_eq!(plan_a, plan_b);

    assert_eq!(a.secrets.len(), 1);
    assert_ne!(a.secrets[0].expose_value(), b.secrets[0].expose_value());
}

#[test]
fn plan_serializes_descriptors_and_edges() {
    let output = synthesize(reference_config()).unwrap();
    let plan = serde_json::to_value(&output.topology).unwrap();

    assert_eq!(plan["network"]["zones"].as_array().unwrap().len(), 2);
    assert!(plan["graph"]["edges"].as_array().unwrap().iter().any(|e| {
        e["dependent"] == "auth" && e["prerequisite"] == "auth-db-health"
    }));
    // the opaque reference serializes, the generated value never does
    let rendered = plan.to_string();
    assert!(rendered.contains("secret://auth-db/password"));
    assert!(!rendered.contains(output.secrets[0].expose_value()));
}

#[test]
fn duplicate_ports_abort_synthesis() {
    let config = SynthConfig::new("stack", 2, 2)
        .with_service(ServiceSpec::new("billing", "billing-service", vec![4001, 4001]));
    assert!(matches!(
        synthesize(config),
        Err(TopologyError::DuplicatePort { port: 4001, .. })
    ));
}

#[test]
fn zero_zones_abort_synthesis() {
    let config = SynthConfig::new("stack", 0, 2);
    assert!(matches!(
        synthesize(config),
        Err(TopologyError::Configuration(_))
    ));
}
