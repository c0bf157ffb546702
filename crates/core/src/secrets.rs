//! Secret resolution for run database connections.
//!
//! A run lists its secret sources under `spec.secret_sources`:
//!
//! ```yaml
//! secret_sources:
//!   - kind: env
//!     source: "DB_USER,DB_PASSWORD"
//!   - kind: inline
//!     source: { token: "abc" }
//! ```

use indexmap::IndexMap;
use rk_protocol::{RunSpec, SecretSource};
use serde_json::Value;
use tracing::warn;

/// Resolved secrets, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretContext {
    values: IndexMap<String, String>,
}

impl SecretContext {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves the secret context of a run.
pub trait SecretsProvider: Send + Sync {
    fn resolve(&self, run: &RunSpec) -> SecretContext;
}

/// Default provider handling the `env` and `inline` source kinds.
#[derive(Debug, Clone, Default)]
pub struct SecretsStore;

impl SecretsStore {
    fn add_source(ctx: &mut SecretContext, source: &SecretSource) {
        match source.kind.as_str() {
            "env" => {
                let names = match &source.source {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    if let Ok(value) = std::env::var(name) {
                        ctx.insert(name, value);
                    }
                }
            }
            "inline" => {
                if let Value::Object(map) = &source.source {
                    for (name, value) in map {
                        let value = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        ctx.insert(name.clone(), value);
                    }
                }
            }
            other => warn!(kind = other, "Ignoring unknown secret source kind"),
        }
    }
}

impl SecretsProvider for SecretsStore {
    fn resolve(&self, run: &RunSpec) -> SecretContext {
        let mut ctx = SecretContext::default();
        for source in &run.spec.secret_sources {
            Self::add_source(&mut ctx, source);
        }
        ctx
    }
}
