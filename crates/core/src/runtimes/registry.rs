//! Runtime registry.
//!
//! The `RuntimeRegistry` is responsible for:
//! - Registering runtime strategies by kind
//! - Resolving the runtime a run asks for in `spec.runtime.kind`

use super::base::Runtime;
use super::local::LocalRuntime;
use super::mock::MockRuntime;
use crate::error::{RunError, RunResult};
use rk_protocol::RunSpec;
use std::collections::HashMap;
use std::sync::Arc;

/// Runtime used when a run does not name one.
pub const DEFAULT_RUNTIME: &str = "local";

#[derive(Clone, Default)]
pub struct RuntimeRegistry {
    runtimes: HashMap<String, Arc<dyn Runtime>>,
}

impl RuntimeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the `local` and `mock` runtimes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LocalRuntime::new()));
        registry.register(Arc::new(MockRuntime::echo()));
        registry
    }

    /// Register a runtime under its own kind, replacing any previous one.
    pub fn register(&mut self, runtime: Arc<dyn Runtime>) {
        self.runtimes.insert(runtime.kind().to_string(), runtime);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Runtime>> {
        self.runtimes.get(kind).cloned()
    }

    /// Look up a runtime by kind.
    ///
    /// # Returns
    ///
    /// `RunError::Configuration` when no runtime is registered for `kind`.
    pub fn resolve(&self, kind: &str) -> RunResult<Arc<dyn Runtime>> {
        self.get(kind).ok_or_else(|| {
            RunError::Configuration(format!("unknown runtime kind '{}'", kind))
        })
    }

    /// The runtime requested by `run`, falling back to [`DEFAULT_RUNTIME`].
    pub fn for_run(&self, run: &RunSpec) -> RunResult<Arc<dyn Runtime>> {
        let kind = run.spec.runtime.kind.trim();
        self.resolve(if kind.is_empty() { DEFAULT_RUNTIME } else { kind })
    }

    /// Registered kinds, sorted.
    pub fn list_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.runtimes.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn has_runtime(&self, kind: &str) -> bool {
        self.runtimes.contains_key(kind)
    }
}
