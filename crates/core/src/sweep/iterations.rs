//! Iteration table aggregation.
//!
//! Each sweep child contributes one row. Columns are the union of the
//! children's flattened parameters (`param.<name>`) and outputs
//! (`output.<name>`) in first-seen order, followed by `state` and `iter`.
//! Nested maps are flattened with dotted names; absent cells are `null`.

use indexmap::{IndexMap, IndexSet};
use rk_protocol::{IterationTable, RunSpec};
use serde_json::Value;

struct IterationRecord {
    cells: IndexMap<String, Value>,
    state: Value,
    iteration: u32,
}

fn flatten_into(prefix: &str, value: &Value, out: &mut IndexMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&format!("{prefix}.{key}"), nested, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

fn flatten_map<'a>(
    prefix: &str,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
    columns: &mut IndexSet<String>,
    cells: &mut IndexMap<String, Value>,
) {
    let mut flat = IndexMap::new();
    for (key, value) in entries {
        flatten_into(&format!("{prefix}.{key}"), value, &mut flat);
    }
    for (column, value) in flat {
        columns.insert(column.clone());
        cells.insert(column, value);
    }
}

/// Build the iteration table of a sweep, ordered by iteration number.
///
/// An empty input yields an empty table (no header row).
pub fn aggregate_iterations(results: &[RunSpec]) -> IterationTable {
    if results.is_empty() {
        return IterationTable::default();
    }

    let mut param_columns = IndexSet::new();
    let mut output_columns = IndexSet::new();
    let mut records: Vec<IterationRecord> = Vec::with_capacity(results.len());

    for result in results {
        let mut cells = IndexMap::new();
        flatten_map(
            "param",
            result.spec.parameters.iter(),
            &mut param_columns,
            &mut cells,
        );
        if let Some(status) = &result.status {
            flatten_map(
                "output",
                status.outputs.iter(),
                &mut output_columns,
                &mut cells,
            );
        }
        records.push(IterationRecord {
            cells,
            state: result
                .state()
                .map_or(Value::Null, |s| Value::String(s.as_str().to_string())),
            iteration: result.metadata.iteration,
        });
    }

    records.sort_by_key(|r| r.iteration);

    let columns: Vec<String> = param_columns.into_iter().chain(output_columns).collect();
    let mut header: Vec<Value> = columns.iter().cloned().map(Value::String).collect();
    header.push(Value::String("state".to_string()));
    header.push(Value::String("iter".to_string()));

    let mut table = Vec::with_capacity(records.len() + 1);
    table.push(header);
    for mut record in records {
        let mut row: Vec<Value> = columns
            .iter()
            .map(|c| record.cells.swap_remove(c).unwrap_or(Value::Null))
            .collect();
        row.push(record.state);
        row.push(Value::from(record.iteration));
        table.push(row);
    }
    IterationTable(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk_protocol::RunState;
    use serde_json::json;

    fn child(iteration: u32, params: Value, outputs: Value, state: Option<RunState>) -> RunSpec {
        let mut run = RunSpec::new("train");
        run.metadata.iteration = iteration;
        if let Value::Object(map) = params {
            run.spec.parameters = map.into_iter().collect();
        }
        if let Value::Object(map) = outputs {
            run.status_mut().outputs = map.into_iter().collect();
        }
        if state.is_some() {
            run.status_mut().state = state;
        }
        run
    }

    #[test]
    fn test_header_and_rows() {
        let done = Some(RunState::Completed);
        let results = vec![
            child(1, json!({"p1": 1}), json!({"accuracy": 0.9}), done),
            child(2, json!({"p1": 2}), json!({"accuracy": 0.8}), done),
        ];
        let table = aggregate_iterations(&results);

        assert_eq!(
            table.header(),
            &[
                json!("param.p1"),
                json!("output.accuracy"),
                json!("state"),
                json!("iter"),
            ]
        );
        assert_eq!(
            table.rows()[0],
            vec![json!(1), json!(0.9), json!("completed"), json!(1)]
        );
        assert_eq!(
            table.rows()[1],
            vec![json!(2), json!(0.8), json!("completed"), json!(2)]
        );
    }

    #[test]
    fn test_union_of_columns_and_missing_cells() {
        let done = Some(RunState::Completed);
        let results = vec![
            child(1, json!({"p1": 1}), json!({"a": 1}), done),
            child(2, json!({"p1": 2}), json!({"b": 2}), Some(RunState::Error)),
        ];
        let table = aggregate_iterations(&results);

        assert_eq!(
            table.header(),
            &[
                json!("param.p1"),
                json!("output.a"),
                json!("output.b"),
                json!("state"),
                json!("iter"),
            ]
        );
        assert_eq!(table.cell(0, "output.b"), Some(&Value::Null));
        assert_eq!(table.cell(1, "output.a"), Some(&Value::Null));
        assert_eq!(table.cell(1, "state"), Some(&json!("error")));
    }

    #[test]
    fn test_nested_maps_are_flattened() {
        let results = vec![child(
            1,
            json!({"opt": {"name": "adam", "betas": [0.9, 0.99]}}),
            json!({"eval": {"f1": 0.5}}),
            None,
        )];
        let table = aggregate_iterations(&results);

        assert_eq!(
            table.header(),
            &[
                json!("param.opt.name"),
                json!("param.opt.betas"),
                json!("output.eval.f1"),
                json!("state"),
                json!("iter"),
            ]
        );
        assert_eq!(table.cell(0, "param.opt.betas"), Some(&json!([0.9, 0.99])));
        assert_eq!(table.cell(0, "state"), Some(&Value::Null));
    }

    #[test]
    fn test_rows_sorted_by_iteration() {
        let results = vec![
            child(3, json!({"p": "c"}), json!({}), None),
            child(1, json!({"p": "a"}), json!({}), None),
            child(2, json!({"p": "b"}), json!({}), None),
        ];
        let table = aggregate_iterations(&results);
        let iters: Vec<Value> = table.rows().iter().map(|r| r[r.len() - 1].clone()).collect();
        assert_eq!(iters, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(table.cell(0, "param.p"), Some(&json!("a")));
    }

    #[test]
    fn test_empty_input() {
        let table = aggregate_iterations(&[]);
        assert!(table.is_empty());
        assert!(table.header().is_empty());
    }
}
