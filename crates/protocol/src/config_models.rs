//! Global configuration models for `.runkit/config.toml`.
//!
//! This module defines the structure of the project-wide configuration file
//! that controls where artifacts go, whether a run database is used and how
//! pipeline reports are produced.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents global settings from `.runkit/config.toml`.
///
/// # Example
///
/// ```toml
/// # .runkit/config.toml
/// output_path = "/data/out"
/// rundb = ".runkit/db"
///
/// [report]
/// enabled = true
/// dir = "/tmp/kfp"
///
/// [artifacts]
/// calc_hash = true
/// strict_uploads = false
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Default artifact output path for runs that do not declare one.
    #[serde(default)]
    pub output_path: String,

    /// Location of the file-backed run database. Empty disables persistence.
    #[serde(default)]
    pub rundb: String,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

/// A prefix rewrite applied to artifact locations in reports.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UrlRewrite {
    pub prefix: String,
    pub replacement: String,
}

/// Pipeline UI report settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Write report documents when a run is finalized.
    #[serde(default)]
    pub enabled: bool,

    /// Directory receiving the report documents.
    #[serde(default = "default_report_dir")]
    pub dir: PathBuf,

    /// Internal storage schemes and their externally reachable equivalents.
    #[serde(default = "default_url_rewrites")]
    pub url_rewrites: Vec<UrlRewrite>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_report_dir(),
            url_rewrites: default_url_rewrites(),
        }
    }
}

/// Artifact handling settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    /// Store a SHA-256 digest of artifact bodies.
    #[serde(default = "default_true")]
    pub calc_hash: bool,

    /// Fail a `log` call that requests an upload but has neither a body nor
    /// an existing local file.
    #[serde(default)]
    pub strict_uploads: bool,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            calc_hash: true,
            strict_uploads: false,
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("/")
}

fn default_url_rewrites() -> Vec<UrlRewrite> {
    vec![UrlRewrite {
        prefix: "v3io:///".to_string(),
        replacement: "http://v3io-webapi:8081/".to_string(),
    }]
}

fn default_true() -> bool {
    true
}
