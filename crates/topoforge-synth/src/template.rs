//! Environment assembly
//!
//! Workload environments are merged from three sources, later wins:
//! the shared template (broker bootstrap addresses), data-store-derived
//! connection variables, then caller-supplied extras. The variable names are
//! the ones the deployed services actually read.

use crate::config::Addressing;
use topoforge_types::{BrokerCluster, DataStore, EnvMap, EnvValue};

/// Broker bootstrap address list, shared by every workload
pub const BOOTSTRAP_SERVERS: &str = "SPRING_KAFKA_BOOTSTRAP_SERVERS";

/// Connection URL of a bound data store
pub const DATASOURCE_URL: &str = "SPRING_DATASOURCE_URL";
/// Master username of a bound data store
pub const DATASOURCE_USERNAME: &str = "SPRING_DATASOURCE_USERNAME";
/// Password reference of a bound data store; always a secret reference
pub const DATASOURCE_PASSWORD: &str = "SPRING_DATASOURCE_PASSWORD";

const ORM_DDL_AUTO: &str = "SPRING_JPA_HIBERNATE_DDL_AUTO";
const SQL_INIT_MODE: &str = "SPRING_SQL_INIT_MODE";
const POOL_INIT_TIMEOUT: &str = "SPRING_DATASOURCE_HIKARI_INITIALIZATION_FAIL_TIMEOUT";

/// Baseline environment shared by every workload
pub fn base_template(broker: &BrokerCluster) -> EnvMap {
    let mut env = EnvMap::new();
    env.insert(
        BOOTSTRAP_SERVERS.into(),
        EnvValue::plain(broker.bootstrap_servers()),
    );
    env
}

/// Connection variables derived from a bound data store
pub fn data_store_env(store: &DataStore) -> EnvMap {
    let mut env = EnvMap::new();
    env.insert(
        DATASOURCE_URL.into(),
        EnvValue::plain(format!(
            "jdbc:postgresql://{}:{}/{}",
            store.endpoint.address, store.endpoint.port, store.database_name
        )),
    );
    env.insert(
        DATASOURCE_USERNAME.into(),
        EnvValue::plain(&store.master_username),
    );
    env.insert(
        DATASOURCE_PASSWORD.into(),
        EnvValue::Secret(store.password.clone()),
    );
    env.insert(ORM_DDL_AUTO.into(), EnvValue::plain("update"));
    env.insert(SQL_INIT_MODE.into(), EnvValue::plain("always"));
    env.insert(POOL_INIT_TIMEOUT.into(), EnvValue::plain("60000"));
    env
}

/// Environment key the gateway reads for an upstream service's URL
///
/// `auth` and `auth-service` both map to `AUTH_SERVICE_URL`.
pub fn upstream_env_key(service: &str) -> String {
    let base = service.trim_end_matches("-service");
    format!("{}_SERVICE_URL", base.to_uppercase().replace('-', "_"))
}

/// URL the gateway uses to reach an upstream
pub fn upstream_url(
    addressing: &Addressing,
    namespace: Option<&str>,
    service: &str,
    port: u16,
) -> String {
    match addressing {
        Addressing::FixedHost { host } => format!("http://{host}:{port}"),
        Addressing::Discovery => {
            // config validation guarantees a namespace in discovery mode
            let namespace = namespace.unwrap_or_default();
            format!("http://{service}.{namespace}:{port}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoforge_types::{Endpoint, NodeId, RemovalPolicy, SecretRef};

    fn store() -> DataStore {
        DataStore {
            name: "auth-db".into(),
            owner: "auth".into(),
            network: NodeId::new("net"),
            engine: "postgres".into(),
            engine_version: "17.2".into(),
            instance_class: "db.t2.micro".into(),
            allocated_storage_gib: 20,
            database_name: "auth-db".into(),
            endpoint: Endpoint::new("auth-db.db.internal", 5432),
            master_username: "admin_user".into(),
            password: SecretRef::new("auth-db", "password"),
            removal_policy: RemovalPolicy::Destroy,
        }
    }

    #[test]
    fn data_store_env_has_connection_keys() {
        let env = data_store_env(&store());
        assert_eq!(
            env.get(DATASOURCE_URL),
            Some(&EnvValue::plain(
                "jdbc:postgresql://auth-db.db.internal:5432/auth-db"
            ))
        );
        assert_eq!(
            env.get(DATASOURCE_USERNAME),
            Some(&EnvValue::plain("admin_user"))
        );
        assert!(matches!(
            env.get(DATASOURCE_PASSWORD),
            Some(EnvValue::Secret(_))
        ));
    }

    #[test]
    fn upstream_key_strips_service_suffix() {
        assert_eq!(upstream_env_key("auth"), "AUTH_SERVICE_URL");
        assert_eq!(upstream_env_key("auth-service"), "AUTH_SERVICE_URL");
        assert_eq!(upstream_env_key("patient-intake"), "PATIENT_INTAKE_SERVICE_URL");
    }

    #[test]
    fn upstream_url_per_addressing() {
        let fixed = Addressing::FixedHost {
            host: "host.docker.internal".into(),
        };
        assert_eq!(
            upstream_url(&fixed, None, "auth", 4005),
            "http://host.docker.internal:4005"
        );
        assert_eq!(
            upstream_url(&Addressing::Discovery, Some("stack-local"), "auth", 4005),
            "http://auth.stack-local:4005"
        );
    }
}
