//! Artifact variants and their summaries.

use indexmap::IndexMap;
use rk_protocol::{ArtifactSummary, ExecutionRef, SourceRef, Viewer};
use serde_json::Value;
use std::borrow::Cow;

const CHART_TEMPLATE: &str = r#"
<html>
  <head>
    <script type="text/javascript" src="https://www.gstatic.com/charts/loader.js"></script>
    <script type="text/javascript">
      google.charts.load('current', {'packages':['corechart']});
      google.charts.setOnLoadCallback(drawChart);
      function drawChart() {
        var data = google.visualization.arrayToDataTable($data$);
        var options = $opts$;
        var chart = new google.visualization.$chart$(document.getElementById('chart_div'));
        chart.draw(data, options);
      }
    </script>
  </head>
  <body>
    <div id="chart_div" style="width: 100%; height: 500px;"></div>
  </body>
</html>
"#;

/// Chart rows rendered into a self-contained HTML page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub header: Vec<Value>,
    pub rows: Vec<Vec<Value>>,
    pub options: IndexMap<String, Value>,
    /// Visualization class, e.g. `LineChart`.
    pub chart: String,
}

impl ChartData {
    pub fn add_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    fn render(&self, key: &str) -> String {
        let mut options = self.options.clone();
        let has_title = match options.get("title") {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if !has_title {
            options.insert("title".to_string(), Value::String(key.to_string()));
        }

        let mut data = Vec::with_capacity(self.rows.len() + 1);
        data.push(Value::Array(self.header.clone()));
        data.extend(self.rows.iter().cloned().map(Value::Array));

        let opts = serde_json::to_string(&options).unwrap_or_default();
        CHART_TEMPLATE
            .replace("$data$", &Value::Array(data).to_string())
            .replace("$opts$", &opts)
            .replace("$chart$", &self.chart)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub body: Option<Vec<u8>>,
    pub format: String,
    pub header: Vec<String>,
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactKind {
    Generic { body: Option<Vec<u8>> },
    Chart(ChartData),
    Table(TableData),
}

/// A named output of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    key: String,
    pub target_path: String,
    pub src_path: String,
    /// Content carried in the summary instead of a storage location.
    pub inline: Option<String>,
    pub tag: String,
    pub hash: Option<String>,
    pub description: String,
    pub viewer: Viewer,
    pub sources: Vec<SourceRef>,
    pub execution: Option<ExecutionRef>,
    pub kind: ArtifactKind,
}

impl Artifact {
    fn with_kind(key: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            key: key.into(),
            target_path: String::new(),
            src_path: String::new(),
            inline: None,
            tag: String::new(),
            hash: None,
            description: String::new(),
            viewer: Viewer::None,
            sources: Vec::new(),
            execution: None,
            kind,
        }
    }

    /// A generic artifact with an optional in-memory body.
    pub fn new(key: impl Into<String>, body: Option<Vec<u8>>) -> Self {
        Self::with_kind(key, ArtifactKind::Generic { body })
    }

    /// A line chart; the first row of `data` is the header.
    pub fn chart(key: impl Into<String>, data: Vec<Vec<Value>>) -> Self {
        let mut rows = data.into_iter();
        let header = rows.next().unwrap_or_default();
        let mut artifact = Self::with_kind(
            key,
            ArtifactKind::Chart(ChartData {
                header,
                rows: rows.collect(),
                options: IndexMap::new(),
                chart: "LineChart".to_string(),
            }),
        );
        artifact.viewer = Viewer::Chart;
        artifact
    }

    pub fn table(
        key: impl Into<String>,
        body: Option<Vec<u8>>,
        format: impl Into<String>,
        header: Vec<String>,
    ) -> Self {
        Self::with_kind(
            key,
            ArtifactKind::Table(TableData {
                body,
                format: format.into(),
                header,
                schema: None,
            }),
        )
    }

    pub fn with_src_path(mut self, path: impl Into<String>) -> Self {
        self.src_path = path.into();
        self
    }

    pub fn with_target_path(mut self, path: impl Into<String>) -> Self {
        self.target_path = path.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_inline(mut self, content: impl Into<String>) -> Self {
        self.inline = Some(content.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Generic { .. } => "",
            ArtifactKind::Chart(_) => "chart",
            ArtifactKind::Table(_) => "table",
        }
    }

    pub fn as_chart_mut(&mut self) -> Option<&mut ChartData> {
        match &mut self.kind {
            ArtifactKind::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    /// Bytes to upload, if the artifact carries them in memory.
    pub fn get_body(&self) -> Option<Cow<'_, [u8]>> {
        match &self.kind {
            ArtifactKind::Generic { body } => body.as_deref().map(Cow::Borrowed),
            ArtifactKind::Table(table) => table.body.as_deref().map(Cow::Borrowed),
            ArtifactKind::Chart(chart) => Some(Cow::Owned(chart.render(&self.key).into_bytes())),
        }
    }

    /// Summary embedded in `status.output_artifacts`.
    pub fn base_summary(&self) -> ArtifactSummary {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let mut summary = ArtifactSummary {
            key: self.key.clone(),
            kind: self.kind_name().to_string(),
            target_path: non_empty(&self.target_path),
            src_path: non_empty(&self.src_path),
            inline: self.inline.clone(),
            tag: self.tag.clone(),
            hash: self.hash.clone(),
            description: self.description.clone(),
            viewer: self.viewer,
            ..Default::default()
        };
        if let ArtifactKind::Table(table) = &self.kind {
            summary.format = table.format.clone();
            summary.header = Some(table.header.clone());
            summary.schema = table.schema.clone();
        }
        summary
    }

    /// Summary with lineage, as stored in the run database.
    pub fn full_summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            sources: self.sources.clone(),
            execution: self.execution.clone(),
            ..self.base_summary()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generic_body() {
        let artifact = Artifact::new("model", Some(b"weights".to_vec()));
        assert_eq!(artifact.get_body().as_deref(), Some(&b"weights"[..]));
        assert_eq!(artifact.kind_name(), "");
        assert!(Artifact::new("empty", None).get_body().is_none());
    }

    #[test]
    fn test_chart_body_defaults_title_to_key() {
        let mut artifact = Artifact::chart(
            "loss",
            vec![
                vec![json!("epoch"), json!("loss")],
                vec![json!(1), json!(0.5)],
            ],
        );
        artifact
            .as_chart_mut()
            .expect("chart")
            .add_row(vec![json!(2), json!(0.25)]);

        let body = artifact.get_body().expect("chart body");
        let html = String::from_utf8(body.into_owned()).expect("utf-8");
        assert!(html.contains(r#"[["epoch","loss"],[1,0.5],[2,0.25]]"#));
        assert!(html.contains(r#"{"title":"loss"}"#));
        assert!(html.contains("google.visualization.LineChart"));
        assert_eq!(artifact.viewer, Viewer::Chart);
    }

    #[test]
    fn test_chart_keeps_explicit_title() {
        let mut artifact = Artifact::chart("loss", vec![vec![json!("x")]]);
        artifact
            .as_chart_mut()
            .expect("chart")
            .options
            .insert("title".to_string(), json!("Training loss"));
        let html =
            String::from_utf8(artifact.get_body().expect("body").into_owned()).expect("utf-8");
        assert!(html.contains(r#""title":"Training loss""#));
    }

    #[test]
    fn test_table_summary_fields() {
        let artifact = Artifact::table("scores", None, "csv", vec!["a".into(), "b".into()])
            .with_target_path("/out/scores.csv")
            .with_viewer(Viewer::Table);
        let summary = artifact.base_summary();
        assert_eq!(summary.kind, "table");
        assert_eq!(summary.format, "csv");
        assert_eq!(summary.header, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(summary.target_path.as_deref(), Some("/out/scores.csv"));
        assert_eq!(summary.src_path, None);
    }

    #[test]
    fn test_full_summary_adds_lineage() {
        let mut artifact = Artifact::new("model", None);
        artifact.sources = vec![SourceRef {
            key: "data".to_string(),
            path: "/in/data.csv".to_string(),
        }];
        artifact.execution = Some(ExecutionRef {
            uid: "u1".to_string(),
            ..Default::default()
        });

        assert!(artifact.base_summary().sources.is_empty());
        let full = artifact.full_summary();
        assert_eq!(full.sources.len(), 1);
        assert_eq!(full.execution.map(|e| e.uid), Some("u1".to_string()));
    }
}
