//! Pipeline UI reporting documents.
//!
//! After a run is finalized, two JSON documents are written to the reporting
//! directory so that an external pipeline UI can pick them up:
//!
//! - [`METRICS_FILE`]: numeric outputs of the run
//! - [`UI_METADATA_FILE`]: display blocks (web apps, tables, markdown)

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// File name of the metrics document.
pub const METRICS_FILE: &str = "mlpipeline-metrics.json";

/// File name of the UI metadata document.
pub const UI_METADATA_FILE: &str = "mlpipeline-ui-metadata.json";

/// One numeric output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    #[serde(rename = "numberValue")]
    pub number_value: Number,
}

/// `{"metrics": [...]}`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MetricsDocument {
    pub metrics: Vec<Metric>,
}

/// A typed display block of the UI metadata document.
///
/// Serialized with an inline `type` tag:
/// ```json
/// {"type": "table", "format": "csv", "header": ["a", "b"], "source": "/out/t.csv"}
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiBlock {
    WebApp {
        source: String,
    },
    Table {
        format: String,
        header: Vec<String>,
        source: String,
    },
    Markdown {
        storage: String,
        source: String,
    },
}

impl UiBlock {
    /// Markdown block whose content is carried inline.
    pub fn inline_markdown(source: String) -> Self {
        UiBlock::Markdown {
            storage: "inline".to_string(),
            source,
        }
    }
}

/// `{"outputs": [...]}`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UiMetadataDocument {
    pub outputs: Vec<UiBlock>,
}
