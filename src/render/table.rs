//! GitHub-flavoured Markdown tables.

use crate::combine::MetricTable;
use crate::types::{Cell, Metric};

/// No data for this `n`.
pub const MISSING_GLYPH: &str = "*";
/// The run was killed for exhausting memory.
pub const RESOURCE_GLYPH: &str = "💾";
/// The run failed for any other reason.
pub const ERROR_GLYPH: &str = "❌";

pub fn format_cell(metric: Metric, cell: &Cell) -> String {
    match cell {
        Cell::Present(value) => format!("{:.*}", metric.decimals(), value),
        Cell::Missing => MISSING_GLYPH.to_string(),
        Cell::Failed(failure) if failure.is_resource_exhausted() => RESOURCE_GLYPH.to_string(),
        Cell::Failed(_) => ERROR_GLYPH.to_string(),
    }
}

/// Render `table` with a header row (`n` plus column names), a
/// right-alignment row and one row per `n`.
pub fn render_table(table: &MetricTable) -> String {
    let header: Vec<String> = std::iter::once("n".to_string())
        .chain(table.columns.iter().cloned())
        .collect();

    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.n.to_string())
                .chain(row.cells.iter().map(|cell| format_cell(table.metric, cell)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(1)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);

    out.push('|');
    for width in &widths {
        out.push_str(&"-".repeat(width + 1));
        out.push_str(":|");
    }
    out.push('\n');

    for row in &body {
        push_row(&mut out, row, &widths);
    }

    // Templates add their own trailing newline.
    out.pop();
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        out.push(' ');
        out.push_str(&" ".repeat(pad));
        out.push_str(cell);
        out.push_str(" |");
    }
    out.push('\n');
}
