//! Loader for the `.runkit/` project directory.
//!
//! Layout:
//! - `config.toml`: global settings
//! - `runs/*.yaml` (or `*.yml`): run definitions

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AppConfig, RunDefinition};
use rk_protocol::{GlobalConfig, RunSpec};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Directory, relative to the project root, holding runkit configuration.
pub const CONFIG_DIR: &str = ".runkit";

/// Loads all configuration from the `.runkit/` directory under `root`.
///
/// Missing directories or files yield defaults rather than errors. Run
/// definitions are read in file name order; a definition without
/// `metadata.name` is named after its file stem.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - `config.toml` or a run definition has invalid syntax
/// - Two run definitions share a name
///
/// # Example
///
/// ```rust,no_run
/// use rk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} runs", config.runs.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let rk_dir = root.join(CONFIG_DIR);

    if !rk_dir.exists() {
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&rk_dir)?;
    let runs = load_runs(&rk_dir)?;
    debug!(dir = %rk_dir.display(), runs = runs.len(), "Loaded configuration");

    Ok(AppConfig { global, runs })
}

/// Reads a single run definition from a YAML file.
pub fn load_run_file(path: &Path) -> ConfigResult<RunSpec> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut run: RunSpec =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    if run.metadata.name.trim().is_empty() {
        run.metadata.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }
    if run.metadata.iteration != 0 {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "run definitions must not set metadata.iteration".to_string(),
        });
    }
    Ok(run)
}

fn load_global_config(rk_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = rk_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

fn load_runs(rk_dir: &Path) -> ConfigResult<Vec<RunDefinition>> {
    let runs_dir = rk_dir.join("runs");

    if !runs_dir.exists() {
        return Ok(Vec::new());
    }

    let mut runs: Vec<RunDefinition> = Vec::new();

    for entry in WalkDir::new(&runs_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: runs_dir.clone(),
            source,
        })?;

        let path = entry.path();
        let ext = path.extension().and_then(|s| s.to_str());
        if !entry.file_type().is_file() || (ext != Some("yaml") && ext != Some("yml")) {
            continue;
        }

        let run = load_run_file(path)?;
        if let Some(existing) = runs
            .iter()
            .find(|def| def.run.metadata.name == run.metadata.name)
        {
            return Err(ConfigError::DuplicateRun {
                name: run.metadata.name,
                first: existing.path.clone(),
                second: path.to_path_buf(),
            });
        }

        runs.push(RunDefinition {
            path: path.to_path_buf(),
            run,
        });
    }

    Ok(runs)
}
