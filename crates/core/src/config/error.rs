//! Errors raised while loading `.runkit/` settings and run definitions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `config.toml` is not valid TOML or does not match [`GlobalConfig`].
    ///
    /// [`GlobalConfig`]: rk_protocol::GlobalConfig
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A run definition is not valid YAML or does not match a run structure.
    #[error("Failed to parse run definition at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to traverse directory {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Two run definitions share a name.
    #[error("Run '{name}' is defined twice: {first} and {second}")]
    DuplicateRun {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
