//! Artifact logging.
//!
//! This module provides:
//! - [`Artifact`]: a named output (generic, chart or table) with its body
//! - [`ArtifactManager`]: per-run registry that resolves target paths,
//!   uploads bodies and records metadata in the run database
//! - [`ArtifactEnv`]: the shared collaborators every manager is built from

pub mod manager;
pub mod model;

pub use manager::{join_path, ArtifactManager, LogItem, LogOptions};
pub use model::{Artifact, ArtifactKind, ChartData, TableData};

use crate::rundb::{get_run_db, RunDb};
use crate::store::{StoreManager, StoreResolver};
use rk_protocol::GlobalConfig;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// What to do when an upload has neither a body nor a local file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPolicy {
    /// Record metadata only.
    #[default]
    Lenient,
    /// Fail the `log` call with a storage error.
    Strict,
}

/// Stores, run database and logging options shared by artifact managers.
#[derive(Clone)]
pub struct ArtifactEnv {
    pub stores: Arc<dyn StoreResolver>,
    pub rundb: Option<Arc<dyn RunDb>>,
    pub calc_hash: bool,
    pub upload_policy: UploadPolicy,
}

impl ArtifactEnv {
    pub fn new(stores: Arc<dyn StoreResolver>) -> Self {
        Self {
            stores,
            rundb: None,
            calc_hash: true,
            upload_policy: UploadPolicy::Lenient,
        }
    }

    pub fn with_rundb(mut self, rundb: Arc<dyn RunDb>) -> Self {
        self.rundb = Some(rundb);
        self
    }

    pub fn with_calc_hash(mut self, calc_hash: bool) -> Self {
        self.calc_hash = calc_hash;
        self
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    /// Build from the project configuration.
    pub fn from_config(config: &GlobalConfig, stores: Arc<dyn StoreResolver>) -> Self {
        let policy = if config.artifacts.strict_uploads {
            UploadPolicy::Strict
        } else {
            UploadPolicy::Lenient
        };
        let env = Self::new(stores)
            .with_calc_hash(config.artifacts.calc_hash)
            .with_upload_policy(policy);
        match get_run_db(&config.rundb) {
            Some(db) => env.with_rundb(db),
            None => env,
        }
    }
}

impl Default for ArtifactEnv {
    fn default() -> Self {
        Self::new(Arc::new(StoreManager::new()))
    }
}

/// Hex-encoded SHA-256 of an artifact body.
pub fn compute_hash(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}
