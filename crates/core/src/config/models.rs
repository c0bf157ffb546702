//! Loaded project configuration and the collaborators built from it.

use crate::artifacts::ArtifactEnv;
use crate::engine::RunExecutor;
use crate::report::ReportRenderer;
use crate::rundb::{get_run_db, RunDb};
use crate::runtimes::Runtime;
use crate::store::StoreResolver;
use rk_protocol::{GlobalConfig, RunSpec};
use std::path::PathBuf;
use std::sync::Arc;

/// A run definition and the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDefinition {
    pub path: PathBuf,
    pub run: RunSpec,
}

/// Everything loaded from a project's `.runkit/` directory.
///
/// - `config.toml`: global settings
/// - `runs/*.yaml`: run definitions, keyed by `metadata.name`
///
/// # Example
///
/// ```rust,no_run
/// use rk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// for def in &config.runs {
///     println!("{} ({})", def.run.metadata.name, def.path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub global: GlobalConfig,
    pub runs: Vec<RunDefinition>,
}

impl AppConfig {
    pub fn find_run(&self, name: &str) -> Option<&RunSpec> {
        self.runs
            .iter()
            .find(|def| def.run.metadata.name == name)
            .map(|def| &def.run)
    }

    pub fn run_names(&self) -> Vec<&str> {
        self.runs
            .iter()
            .map(|def| def.run.metadata.name.as_str())
            .collect()
    }

    pub fn rundb(&self) -> Option<Arc<dyn RunDb>> {
        get_run_db(&self.global.rundb)
    }

    pub fn artifact_env(&self, stores: Arc<dyn StoreResolver>) -> ArtifactEnv {
        ArtifactEnv::from_config(&self.global, stores)
    }

    /// The report renderer, when reporting is enabled.
    pub fn report_renderer(&self) -> Option<ReportRenderer> {
        self.global
            .report
            .enabled
            .then(|| ReportRenderer::from_config(&self.global.report))
    }

    /// An executor over `runtime` wired with the configured run database
    /// and report renderer.
    pub fn executor(&self, runtime: Arc<dyn Runtime>) -> RunExecutor {
        let mut executor = RunExecutor::new(runtime);
        if let Some(db) = self.rundb() {
            executor = executor.with_rundb(db);
        }
        if let Some(renderer) = self.report_renderer() {
            executor = executor.with_report(renderer);
        }
        executor
    }

    /// Apply the global `output_path` to a run that does not set its own.
    pub fn apply_defaults(&self, run: &mut RunSpec) {
        if run.spec.output_path.is_empty() {
            run.spec.output_path = self.global.output_path.clone();
        }
    }
}
