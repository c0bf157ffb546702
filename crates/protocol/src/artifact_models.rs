//! Artifact summary models.
//!
//! These are the serializable views of an artifact that are embedded in
//! `status.output_artifacts` and persisted to the run database. The in-memory
//! artifact (with its body) lives in `rk-core`.
//!
//! Summaries arrive from external runtimes, so deserialization is lenient on
//! the fields that only drive reporting: a non-string target or an unknown
//! viewer decodes to "absent" instead of failing the whole run structure.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Display hint for an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewer {
    /// No viewer, serialized as an empty string.
    #[default]
    None,
    Table,
    Chart,
    WebApp,
}

impl Viewer {
    pub fn as_str(self) -> &'static str {
        match self {
            Viewer::None => "",
            Viewer::Table => "table",
            Viewer::Chart => "chart",
            Viewer::WebApp => "web-app",
        }
    }

    /// Parse a viewer name. Unknown names map to [`Viewer::None`].
    pub fn parse(name: &str) -> Self {
        match name {
            "table" => Viewer::Table,
            "chart" => Viewer::Chart,
            "web-app" => Viewer::WebApp,
            _ => Viewer::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Viewer::None)
    }
}

impl Serialize for Viewer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Viewer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Viewer::parse).unwrap_or_default())
    }
}

/// One lineage entry: a declared input of the producing run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub key: String,
    pub path: String,
}

/// Snapshot of the identity of the run that produced an artifact.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionRef {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub iteration: u32,
}

/// Serializable summary of a logged artifact.
///
/// The base summary (embedded in run status) leaves `sources` and
/// `execution` empty; the full summary (persisted to the run database)
/// carries them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ArtifactSummary {
    #[serde(default)]
    pub key: String,

    /// Variant name: empty for generic artifacts, `chart` or `table`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_path: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub src_path: Option<String>,

    /// Inline payload that takes the place of `target_path` in reports.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub inline: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Viewer::is_none")]
    pub viewer: Viewer,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,

    #[serde(
        default,
        deserialize_with = "lenient_header",
        skip_serializing_if = "Option::is_none"
    )]
    pub header: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionRef>,
}

impl ArtifactSummary {
    /// Location shown in reports: the inline payload if any, otherwise the
    /// resolved target path.
    pub fn location(&self) -> Option<&str> {
        self.inline.as_deref().or(self.target_path.as_deref())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_header<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let header: Option<Vec<String>> = items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect();
    Ok(header)
}
