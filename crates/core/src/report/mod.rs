//! Pipeline UI report documents.
//!
//! When a run is finalized with reporting enabled, two JSON documents are
//! written into the report directory:
//!
//! - `mlpipeline-metrics.json`: one metric per numeric output
//! - `mlpipeline-ui-metadata.json`: viewer blocks for artifacts, the
//!   iteration table (if any) and the run metadata as YAML

pub mod markdown;

use crate::error::{RunError, RunResult};
use markdown::markdown_table;
use rk_protocol::{
    ArtifactSummary, Metric, MetricsDocument, ReportConfig, RunSpec, UiBlock, UiMetadataDocument,
    UrlRewrite, Viewer, METRICS_FILE, UI_METADATA_FILE,
};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Both report documents of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocuments {
    pub metrics: MetricsDocument,
    pub ui_metadata: UiMetadataDocument,
}

#[derive(Debug, Clone)]
pub struct ReportRenderer {
    dir: PathBuf,
    url_rewrites: Vec<UrlRewrite>,
}

impl ReportRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_rewrites: ReportConfig::default().url_rewrites,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            url_rewrites: config.url_rewrites.clone(),
        }
    }

    pub fn with_url_rewrites(mut self, rewrites: Vec<UrlRewrite>) -> Self {
        self.url_rewrites = rewrites;
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Apply the first matching prefix rewrite.
    pub fn rewrite_url(&self, url: &str) -> String {
        for rewrite in &self.url_rewrites {
            if let Some(rest) = url.strip_prefix(rewrite.prefix.as_str()) {
                return format!("{}{}", rewrite.replacement, rest);
            }
        }
        url.to_string()
    }

    /// Build the documents without touching the filesystem.
    pub fn render(&self, run: &RunSpec) -> ReportDocuments {
        let Some(status) = &run.status else {
            return ReportDocuments {
                metrics: MetricsDocument::default(),
                ui_metadata: UiMetadataDocument {
                    outputs: vec![metadata_block(run, true)],
                },
            };
        };

        let metrics = status
            .outputs
            .iter()
            .filter_map(|(name, value)| match value {
                Value::Number(n) => Some(Metric {
                    name: name.clone(),
                    number_value: n.clone(),
                }),
                _ => None,
            })
            .collect();

        let mut outputs: Vec<UiBlock> = status
            .output_artifacts
            .iter()
            .filter_map(|artifact| self.artifact_block(artifact))
            .collect();

        let iterations = status.iterations.as_ref().filter(|t| !t.is_empty());
        if let Some(table) = iterations {
            outputs.push(UiBlock::inline_markdown(format!(
                "# Run Report\n## Iterations\n{}",
                markdown_table(table.header(), table.rows())
            )));
        }
        outputs.push(metadata_block(run, iterations.is_none()));

        ReportDocuments {
            metrics: MetricsDocument { metrics },
            ui_metadata: UiMetadataDocument { outputs },
        }
    }

    fn artifact_block(&self, artifact: &ArtifactSummary) -> Option<UiBlock> {
        let location = artifact.location()?;
        match artifact.viewer {
            Viewer::WebApp | Viewer::Chart => Some(UiBlock::WebApp {
                source: self.rewrite_url(location),
            }),
            Viewer::Table => {
                let header = artifact.header.as_ref().filter(|h| !h.is_empty())?;
                if !location.ends_with(".csv") {
                    return None;
                }
                Some(UiBlock::Table {
                    format: "csv".to_string(),
                    header: header.clone(),
                    source: self.rewrite_url(location),
                })
            }
            Viewer::None => None,
        }
    }

    /// Write both documents into the report directory.
    pub fn write(&self, docs: &ReportDocuments) -> RunResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| RunError::Report {
            path: self.dir.clone(),
            source,
        })?;
        write_document(&self.dir.join(METRICS_FILE), &docs.metrics)?;
        write_document(&self.dir.join(UI_METADATA_FILE), &docs.ui_metadata)?;
        debug!(dir = %self.dir.display(), "Wrote report documents");
        Ok(())
    }

    pub fn render_and_write(&self, run: &RunSpec) -> RunResult<ReportDocuments> {
        let docs = self.render(run);
        self.write(&docs)?;
        Ok(docs)
    }
}

fn write_document<T: Serialize>(path: &Path, doc: &T) -> RunResult<()> {
    let body = serde_json::to_vec(doc).map_err(|e| RunError::Report {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    fs::write(path, body).map_err(|source| RunError::Report {
        path: path.to_path_buf(),
        source,
    })
}

fn metadata_block(run: &RunSpec, with_title: bool) -> UiBlock {
    let mut metadata = run.clone();
    if let Some(status) = metadata.status.as_mut() {
        status.iterations = None;
    }
    let yaml = serde_yaml::to_string(&metadata)
        .unwrap_or_else(|e| format!("# metadata unavailable: {e}\n"));
    let title = if with_title { "# Run Report\n" } else { "" };
    UiBlock::inline_markdown(format!("{title}## Metadata\n```yaml\n{yaml}```\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk_protocol::{IterationTable, RunState};
    use serde_json::json;
    use tempfile::tempdir;

    fn artifact(key: &str, target: &str, viewer: Viewer) -> ArtifactSummary {
        ArtifactSummary {
            key: key.to_string(),
            target_path: Some(target.to_string()),
            viewer,
            ..Default::default()
        }
    }

    fn finished_run() -> RunSpec {
        let mut run = RunSpec::new("train");
        let status = run.status_mut();
        status.state = Some(RunState::Completed);
        status.outputs.insert("accuracy".to_string(), json!(0.9));
        status.outputs.insert("loss".to_string(), json!(3));
        status.outputs.insert("note".to_string(), json!("ok"));
        status.outputs.insert("converged".to_string(), json!(true));
        run
    }

    #[test]
    fn test_metrics_only_numbers() {
        let docs = ReportRenderer::new("/tmp").render(&finished_run());
        let names: Vec<&str> = docs.metrics.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["accuracy", "loss"]);
        assert_eq!(
            serde_json::to_value(&docs.metrics).unwrap(),
            json!({"metrics": [
                {"name": "accuracy", "numberValue": 0.9},
                {"name": "loss", "numberValue": 3}
            ]})
        );
    }

    #[test]
    fn test_web_app_block_with_rewrite() {
        let mut run = finished_run();
        run.status_mut().output_artifacts = vec![
            artifact("page", "v3io:///users/page.html", Viewer::WebApp),
            artifact("plot", "/out/plot.html", Viewer::Chart),
            artifact("raw", "/out/raw.bin", Viewer::None),
        ];
        let docs = ReportRenderer::new("/tmp").render(&run);

        assert_eq!(
            docs.ui_metadata.outputs[0],
            UiBlock::WebApp {
                source: "http://v3io-webapi:8081/users/page.html".to_string()
            }
        );
        assert_eq!(
            docs.ui_metadata.outputs[1],
            UiBlock::WebApp {
                source: "/out/plot.html".to_string()
            }
        );
        // raw artifact produces no block; metadata block closes the list
        assert_eq!(docs.ui_metadata.outputs.len(), 3);
    }

    #[test]
    fn test_table_block_requires_csv_and_header() {
        let mut with_header = artifact("t", "/out/t.csv", Viewer::Table);
        with_header.header = Some(vec!["a".to_string(), "b".to_string()]);
        let mut parquet = artifact("p", "/out/p.parquet", Viewer::Table);
        parquet.header = Some(vec!["a".to_string()]);
        let no_header = artifact("n", "/out/n.csv", Viewer::Table);

        let mut run = finished_run();
        run.status_mut().output_artifacts = vec![with_header, parquet, no_header];
        let docs = ReportRenderer::new("/tmp").render(&run);

        assert_eq!(
            docs.ui_metadata.outputs[0],
            UiBlock::Table {
                format: "csv".to_string(),
                header: vec!["a".to_string(), "b".to_string()],
                source: "/out/t.csv".to_string(),
            }
        );
        assert_eq!(docs.ui_metadata.outputs.len(), 2);
    }

    #[test]
    fn test_inline_location_preferred() {
        let mut page = artifact("page", "/out/page.html", Viewer::WebApp);
        page.inline = Some("<h1>hi</h1>".to_string());
        let mut run = finished_run();
        run.status_mut().output_artifacts = vec![page];

        let docs = ReportRenderer::new("/tmp").render(&run);
        assert_eq!(
            docs.ui_metadata.outputs[0],
            UiBlock::WebApp {
                source: "<h1>hi</h1>".to_string()
            }
        );
    }

    #[test]
    fn test_iterations_and_metadata_blocks() {
        let mut run = finished_run();
        run.status_mut().iterations = Some(IterationTable(vec![
            vec![json!("param.p"), json!("state"), json!("iter")],
            vec![json!(1), json!("completed"), json!(1)],
        ]));
        let docs = ReportRenderer::new("/tmp").render(&run);
        assert_eq!(docs.ui_metadata.outputs.len(), 2);

        let UiBlock::Markdown { storage, source } = &docs.ui_metadata.outputs[0] else {
            panic!("expected markdown block");
        };
        assert_eq!(storage, "inline");
        assert!(source.starts_with("# Run Report\n## Iterations\n"));
        assert!(source.contains("| 1 | completed | 1 |"));

        let UiBlock::Markdown { source, .. } = &docs.ui_metadata.outputs[1] else {
            panic!("expected markdown block");
        };
        assert!(source.starts_with("## Metadata\n```yaml\n"));
        assert!(source.contains("name: train"));
        assert!(!source.contains("iterations"));
    }

    #[test]
    fn test_metadata_block_alone() {
        let docs = ReportRenderer::new("/tmp").render(&finished_run());
        assert_eq!(docs.ui_metadata.outputs.len(), 1);
        let UiBlock::Markdown { source, .. } = &docs.ui_metadata.outputs[0] else {
            panic!("expected markdown block");
        };
        assert!(source.starts_with("# Run Report\n## Metadata\n"));
    }

    #[test]
    fn test_write_documents() {
        let dir = tempdir().expect("Failed to create temp dir");
        let renderer = ReportRenderer::new(dir.path().join("report"));
        renderer.render_and_write(&finished_run()).expect("write");

        let metrics = fs::read_to_string(dir.path().join("report").join(METRICS_FILE)).unwrap();
        let metrics: Value = serde_json::from_str(&metrics).unwrap();
        assert_eq!(metrics["metrics"][0]["name"], json!("accuracy"));
        assert!(dir.path().join("report").join(UI_METADATA_FILE).exists());
    }

    #[test]
    fn test_write_failure_is_report_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let renderer = ReportRenderer::new(blocker.join("sub"));

        let result = renderer.render_and_write(&finished_run());
        assert!(matches!(result, Err(RunError::Report { .. })));
    }
}
