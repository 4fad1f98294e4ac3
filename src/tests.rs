use crate::catalog::Rescale;
use crate::combine::{combine, MetricTable, Series};
use crate::render::render_table;
use crate::types::{Cell, Metric};
use crate::units::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn series_strategy() -> impl Strategy<Value = Series> {
    prop::collection::btree_map(1u64..512, 0.0f64..1e9, 0..16)
        .prop_map(|points| points.into_iter().map(|(n, v)| (n, Cell::Present(v))).collect())
}

fn named_columns() -> impl Strategy<Value = Vec<(String, Series)>> {
    prop::collection::vec(series_strategy(), 1..6).prop_map(|columns| {
        columns
            .into_iter()
            .enumerate()
            .map(|(i, series)| (format!("tool{i}"), series))
            .collect()
    })
}

/// Column name to `(n, cell)` pairs, independent of column order.
fn by_column(table: &MetricTable) -> BTreeMap<String, Vec<(u64, Cell)>> {
    table
        .columns
        .iter()
        .map(|name| {
            let cells = table
                .column_cells(name)
                .into_iter()
                .map(|(n, cell)| (n, cell.clone()))
                .collect();
            (name.clone(), cells)
        })
        .collect()
}

proptest! {
    #[test]
    fn test_rows_strictly_ascending(columns in named_columns()) {
        let width = columns.iter().filter(|(_, s)| !s.is_empty()).count();
        let table = combine(Metric::ProverTime, columns);

        prop_assert_eq!(table.columns.len(), width);
        prop_assert!(table.rows.windows(2).all(|pair| pair[0].n < pair[1].n));
        prop_assert!(table.rows.iter().all(|row| row.cells.len() == width));
    }

    #[test]
    fn test_join_order_independent(
        (columns, shuffled) in named_columns()
            .prop_flat_map(|columns| (Just(columns.clone()), Just(columns).prop_shuffle()))
    ) {
        let forward = combine(Metric::CycleCount, columns);
        let reordered = combine(Metric::CycleCount, shuffled);

        prop_assert_eq!(forward.ns(), reordered.ns());
        prop_assert_eq!(by_column(&forward), by_column(&reordered));
    }

    #[test]
    fn test_every_input_point_survives_the_join(columns in named_columns()) {
        let table = combine(Metric::ProofSize, columns.clone());
        for (name, series) in &columns {
            for (n, cell) in series {
                prop_assert_eq!(table.cell(*n, name), Some(cell));
            }
        }
    }

    #[test]
    fn test_rendered_table_shape(columns in named_columns()) {
        let table = combine(Metric::PeakMemory, columns);
        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();

        prop_assert_eq!(lines.len(), table.rows.len() + 2);
        let pipes = table.columns.len() + 2;
        prop_assert!(lines.iter().all(|line| line.matches('|').count() == pipes));
    }

    #[test]
    fn test_unit_round_trips(value in 0.0f64..1e15) {
        let tolerance = 1e-9 * value.max(1.0);
        prop_assert!((secs_to_ms(ms_to_secs(value)) - value).abs() <= tolerance);
        prop_assert!((kb_to_bytes(bytes_to_kb(value)) - value).abs() <= tolerance);
        prop_assert!((gb_to_bytes(bytes_to_gb(value)) - value).abs() <= tolerance);
    }

    #[test]
    fn test_chained_rescale_is_ceiling(n in 0u64..100_000, chunk in 1u64..256) {
        let rescaled = Rescale::Chained { budget: 200, chunk }.apply(n);
        prop_assert!(rescaled * chunk >= n * 200);
        prop_assert!(rescaled == 0 || (rescaled - 1) * chunk < n * 200);
    }
}

#[test]
fn test_rescale_examples() {
    let chained = Rescale::Chained { budget: 200, chunk: 32 };
    assert_eq!(chained.apply(32), 200);
    assert_eq!(chained.apply(37), 232);
}
