//! Generated credentials and opaque secret references
//!
//! A [`Secret`] is minted exactly once, at resource provisioning time. Only
//! its [`SecretRef`] ever enters a workload environment or the serialized
//! plan; the plaintext value is handed to the external secret store and is
//! deliberately neither `Serialize` nor printable via `Debug`.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SECRET_LEN: usize = 32;

/// Opaque reference to a field of a stored secret
///
/// Resolved only at execution time by the external engine, e.g.
/// `secret://auth-db/password`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretRef(String);

impl SecretRef {
    /// Reference a named field of a stored secret
    pub fn new(secret_name: &str, field: &str) -> Self {
        Self(format!("secret://{secret_name}/{field}"))
    }

    /// The reference string as handed to the executor
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A generated credential
///
/// Freshly random on every synthesis run; everything else in the plan is
/// deterministic.
pub struct Secret {
    name: String,
    field: String,
    value: String,
}

impl Secret {
    /// Generate a new random credential under `name`/`field`
    pub fn generate(name: impl Into<String>, field: impl Into<String>) -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_LEN)
            .map(char::from)
            .collect();
        Self {
            name: name.into(),
            field: field.into(),
            value,
        }
    }

    /// Secret name, as known to the external secret store
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The opaque reference injected into workload environments
    pub fn reference(&self) -> SecretRef {
        SecretRef::new(&self.name, &self.field)
    }

    /// The plaintext value, for hand-off to the external secret store only
    pub fn expose_value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_value() {
        let secret = Secret::generate("auth-db", "password");
        let rendered = format!("{secret:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(secret.expose_value()));
    }

    #[test]
    fn values_differ_per_generation() {
        let a = Secret::generate("db", "password");
        let b = Secret::generate("db", "password");
        assert_ne!(a.expose_value(), b.expose_value());
        assert_eq!(a.reference(), b.reference());
    }

    #[test]
    fn reference_format() {
        let secret = Secret::generate("auth-db", "password");
        assert_eq!(secret.reference().as_str(), "secret://auth-db/password");
    }
}
