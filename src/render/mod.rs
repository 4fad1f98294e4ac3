/// Rendering of combined metric tables.
///
/// Every [`MetricTable`](crate::combine::MetricTable) is rendered twice:
///
/// - as a GitHub-flavoured Markdown table for the report body
/// - as a log-log PNG chart referenced from the report
pub mod plot;
pub mod table;

pub use plot::{ensure_font, plot_path, render_plot};
pub use table::{format_cell, render_table, ERROR_GLYPH, MISSING_GLYPH, RESOURCE_GLYPH};
