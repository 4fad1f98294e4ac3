pub mod catalog;
pub mod combine;
pub mod config;
pub mod error;
pub mod loader;
pub mod machine;
pub mod render;
pub mod report;
pub mod types;
pub mod units;

pub use catalog::{find_case, series_style, BenchmarkCase, ColumnSpec, Marker, Rescale, SeriesStyle, BENCHMARK_CASES};
pub use combine::{combine, CaseResults, MetricTable, Series, TableRow};
pub use config::{PlotConfig, ReportConfig};
pub use error::{ReportError, Result};
pub use loader::{load_column, read_csv_results, read_json_result};
pub use machine::{InfoField, MachineInfo};
pub use render::{plot_path, render_plot, render_table};
pub use report::{generate_report, BenchmarkSection, ReportContext};
pub use types::{Cell, Failure, FailureKind, Metric, RunRecord};

#[cfg(test)]
mod tests;
