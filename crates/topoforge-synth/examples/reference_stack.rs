//! Synthesizes the reference four-service stack and prints the JSON plan.
//!
//! Run with `cargo run --example reference_stack`; set `RUST_LOG=debug` for
//! per-resource provisioning logs.

use topoforge_synth::{synthesize, GatewaySpec, ServiceSpec, SynthConfig};
use topoforge_types::EnvValue;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SynthConfig::new("patient-mgmt", 2, 2)
        .with_discovery_namespace("patient-mgmt-local")
        .with_service(
            ServiceSpec::new("auth", "auth-service", vec![4005])
                .with_data_store()
                .with_secret_env("JWT_SECRET", "auth-jwt"),
        )
        .with_service(ServiceSpec::new("billing", "billing-service", vec![4001, 9001]))
        .with_service(
            ServiceSpec::new("analytics", "analytics-service", vec![4002]).with_broker(),
        )
        .with_service(
            ServiceSpec::new("patient", "patient-service", vec![4000])
                .with_data_store()
                .with_broker()
                .with_dependency("billing")
                .with_env(
                    "BILLING_SERVICE_ADDRESS",
                    EnvValue::plain("host.docker.internal"),
                )
                .with_env("BILLING_SERVICE_GRPC_PORT", EnvValue::plain("9001")),
        )
        .with_gateway(
            GatewaySpec::new("api-gateway", 4004)
                .with_upstream("auth", 4005)
                .with_env("SPRING_PROFILES_ACTIVE", EnvValue::plain("prod")),
        );

    let output = synthesize(config)?;
    for secret in &output.secrets {
        // hand-off point for the external secret store; values never print
        eprintln!("generated credential: {}", secret.reference());
    }
    println!("{}", serde_json::to_string_pretty(&output.topology)?);
    Ok(())
}
