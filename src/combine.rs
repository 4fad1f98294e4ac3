//! Outer join of per-column results into one table per metric.

use crate::catalog::{column_reports, BenchmarkCase, ColumnSpec, Rescale};
use crate::loader::load_column;
use crate::types::{Cell, Metric, RunRecord};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// One column's cells for a single metric, keyed by `n`.
pub type Series = BTreeMap<u64, Cell>;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub n: u64,
    /// One cell per table column, in column order.
    pub cells: Vec<Cell>,
}

/// All columns of one benchmark case for one metric, joined on `n`.
///
/// Rows are strictly ascending in `n` and every row has exactly one cell
/// per column.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    pub metric: Metric,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl MetricTable {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Observed `n` values, ascending.
    pub fn ns(&self) -> Vec<u64> {
        self.rows.iter().map(|row| row.n).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, n: u64, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        let row = self.rows.iter().find(|row| row.n == n)?;
        row.cells.get(index)
    }

    /// `(n, cell)` pairs of one column, ascending in `n`.
    pub fn column_cells<'a>(&'a self, column: &str) -> Vec<(u64, &'a Cell)> {
        match self.column_index(column) {
            Some(index) => self.rows.iter().map(|row| (row.n, &row.cells[index])).collect(),
            None => Vec::new(),
        }
    }

    /// Add `series` as a new column. Rows only this column has are
    /// inserted with [`Cell::Missing`] for every other column. An empty
    /// series adds nothing.
    pub fn outer_join(&mut self, name: impl Into<String>, mut series: Series) {
        let name = name.into();
        if series.is_empty() {
            return;
        }
        if self.column_index(&name).is_some() {
            warn!(column = %name, "duplicate column ignored");
            return;
        }

        let width = self.columns.len();
        self.columns.push(name);

        for row in &mut self.rows {
            row.cells.push(series.remove(&row.n).unwrap_or(Cell::Missing));
        }

        for (n, cell) in series {
            let mut cells = vec![Cell::Missing; width];
            cells.push(cell);
            self.rows.push(TableRow { n, cells });
        }

        self.rows.sort_by_key(|row| row.n);
    }
}

/// Join named series in order.
pub fn combine<I, S>(metric: Metric, columns: I) -> MetricTable
where
    I: IntoIterator<Item = (S, Series)>,
    S: Into<String>,
{
    let mut table = MetricTable::new(metric);
    for (name, series) in columns {
        table.outer_join(name, series);
    }
    table
}

/// Extract one metric from a column's records, rescaling `n` when the
/// column needs it. Runs without a value for the metric are left out.
pub fn series_for(records: &BTreeMap<u64, RunRecord>, metric: Metric, rescale: Option<Rescale>) -> Series {
    records
        .values()
        .filter(|record| !record.cell(metric).is_missing())
        .map(|record| {
            let n = rescale.map_or(record.n, |rule| rule.apply(record.n));
            (n, record.cell(metric).clone())
        })
        .collect()
}

/// Everything loaded for one benchmark case.
#[derive(Debug, Clone)]
pub struct CaseResults {
    pub case: &'static BenchmarkCase,
    pub columns: Vec<(ColumnSpec, BTreeMap<u64, RunRecord>)>,
}

impl CaseResults {
    /// Load every column of `case` from `results_dir`. Columns without
    /// files are kept but contribute nothing to the tables.
    pub fn load(results_dir: &Path, case: &'static BenchmarkCase) -> Self {
        let columns: Vec<_> = case
            .all_columns()
            .into_iter()
            .map(|column| {
                let records = load_column(results_dir, case.name, &column);
                (column, records)
            })
            .collect();

        let present: Vec<&str> = columns
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(column, _)| column.name.as_str())
            .collect();
        info!(benchmark = case.name, columns = ?present, "loaded benchmark results");

        Self { case, columns }
    }

    pub fn table(&self, metric: Metric) -> MetricTable {
        combine(
            metric,
            self.columns
                .iter()
                .filter(|(column, _)| column_reports(&column.name, metric))
                .map(|(column, records)| {
                    (column.name.clone(), series_for(records, metric, column.rescale))
                }),
        )
    }

    /// The five metric tables, in [`Metric::ALL`] order.
    pub fn tables(&self) -> Vec<MetricTable> {
        Metric::ALL.iter().map(|&metric| self.table(metric)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_case;
    use crate::types::Failure;
    use serde_json::json;

    fn series(points: &[(u64, f64)]) -> Series {
        points.iter().map(|&(n, v)| (n, Cell::Present(v))).collect()
    }

    fn record(n: u64, prover_time: f64) -> RunRecord {
        RunRecord {
            n,
            prover_time: Cell::Present(prover_time),
            verifier_time: Cell::Present(1.0),
            proof_size: Cell::Present(10.0),
            cycle_count: Cell::Present(100.0),
            peak_memory: Cell::Missing,
        }
    }

    #[test]
    fn test_outer_join_fills_missing() {
        let table = combine(
            Metric::ProverTime,
            vec![
                ("a", series(&[(1, 1.0), (2, 2.0)])),
                ("b", series(&[(1, 1.5), (4, 4.5)])),
            ],
        );

        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.ns(), vec![1, 2, 4]);
        assert_eq!(table.cell(2, "b"), Some(&Cell::Missing));
        assert_eq!(table.cell(4, "a"), Some(&Cell::Missing));
        assert_eq!(table.cell(4, "b"), Some(&Cell::Present(4.5)));
        assert!(table.rows.iter().all(|row| row.cells.len() == 2));
    }

    #[test]
    fn test_empty_series_adds_no_column() {
        let table = combine(
            Metric::ProofSize,
            vec![("a", series(&[(8, 1.0)])), ("b", Series::new())],
        );
        assert_eq!(table.columns, vec!["a"]);
        assert!(combine::<_, &str>(Metric::ProofSize, vec![]).is_empty());
    }

    #[test]
    fn test_series_for_rescales_and_drops_missing() {
        let mut records = BTreeMap::new();
        records.insert(32, record(32, 1.0));
        records.insert(37, record(37, 2.0));

        let rescaled = series_for(
            &records,
            Metric::ProverTime,
            Some(Rescale::Chained { budget: 200, chunk: 32 }),
        );
        assert_eq!(rescaled.keys().copied().collect::<Vec<_>>(), vec![200, 232]);

        assert!(series_for(&records, Metric::PeakMemory, None).is_empty());
    }

    #[test]
    fn test_failures_are_kept_as_cells() {
        let mut records = BTreeMap::new();
        records.insert(1, record(1, 1.0));
        records.insert(2, RunRecord::failed(2, Failure::classify(json!({"signal": 9}))));

        let cells = series_for(&records, Metric::CycleCount, None);
        assert!(matches!(cells[&2], Cell::Failed(_)));
    }

    #[test]
    fn test_case_table_drops_openvm_cycle_counts() {
        let case = find_case("sha2").unwrap();
        let columns = case
            .all_columns()
            .into_iter()
            .map(|column| {
                let mut records = BTreeMap::new();
                records.insert(16, record(16, 1.0));
                (column, records)
            })
            .collect();
        let results = CaseResults { case, columns };

        let cycles = results.table(Metric::CycleCount);
        assert!(cycles.column_index("openvm").is_none());
        assert!(cycles.column_index("openvm-precompile").is_none());
        assert!(cycles.column_index("sp1-precompile").is_some());

        let prover = results.table(Metric::ProverTime);
        assert!(prover.column_index("openvm").is_some());
        assert_eq!(results.tables().len(), 5);
    }
}
