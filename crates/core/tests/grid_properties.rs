//! Property tests for grid expansion and task generation.

use proptest::prelude::*;
use rk_core::sweep::{expand_grid, TaskGenerator};
use rk_protocol::{HyperParams, RunSpec};
use serde_json::json;

fn hyperparams_strategy() -> impl Strategy<Value = HyperParams> {
    prop::collection::vec(1usize..4, 1..4).prop_map(|lengths| {
        lengths
            .iter()
            .enumerate()
            .map(|(i, len)| {
                let values = (0..*len).map(|v| json!(v)).collect();
                (format!("p{i}"), values)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn grid_len_is_product_of_list_lengths(hp in hyperparams_strategy()) {
        let grid = expand_grid(&hp);
        let product: usize = hp.values().map(Vec::len).product();
        prop_assert_eq!(grid.len(), product);
    }

    #[test]
    fn grid_points_are_distinct_and_last_param_varies_fastest(hp in hyperparams_strategy()) {
        let grid = expand_grid(&hp);
        let points: Vec<_> = (0..grid.len()).filter_map(|i| grid.point(i)).collect();
        prop_assert_eq!(points.len(), grid.len());

        for (i, a) in points.iter().enumerate() {
            for b in points.iter().skip(i + 1) {
                prop_assert_ne!(a, b);
            }
        }

        let last = format!("p{}", hp.len() - 1);
        let last_len = hp[&last].len();
        for (i, point) in points.iter().enumerate() {
            prop_assert_eq!(&point[&last], &json!(i % last_len));
        }
    }

    #[test]
    fn task_generator_is_restartable(hp in hyperparams_strategy()) {
        let base = RunSpec::new("base").with_param("fixed", 1);
        let grid = expand_grid(&hp);
        let mut generator = TaskGenerator::new(&base, &grid);

        let first: Vec<_> = generator.by_ref().collect();
        generator.restart();
        let second: Vec<_> = generator.collect();

        prop_assert_eq!(first.len(), grid.len());
        prop_assert_eq!(&first, &second);
        for (i, task) in first.iter().enumerate() {
            prop_assert_eq!(task.metadata.iteration as usize, i + 1);
            prop_assert_eq!(&task.spec.parameters["fixed"], &json!(1));
        }
    }
}
