//! Log-log PNG charts of a [`MetricTable`].
//!
//! Text goes through `plotters`' `ab_glyph` backend, which has no font of
//! its own: one TrueType file is registered under `sans-serif` the first
//! time a chart is drawn and reused for the rest of the process.

use crate::catalog::{series_style, Marker, SeriesStyle};
use crate::combine::MetricTable;
use crate::config::PlotConfig;
use crate::error::{ReportError, Result};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

const FONT_FAMILY: &str = "sans-serif";

/// Searched in order when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

/// Register a font for chart text, trying `configured` first.
///
/// Only the first call searches; later calls report the same outcome.
pub fn ensure_font(configured: Option<&Path>) -> Result<&'static Path> {
    FONT.get_or_init(|| load_font(configured))
        .as_deref()
        .map_err(|reason| ReportError::FontUnavailable(reason.clone()))
}

fn load_font(configured: Option<&Path>) -> std::result::Result<PathBuf, String> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        // The backend keeps a `'static` reference to the font data.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                debug!(font = %path.display(), "registered chart font");
                return Ok(path);
            }
            Err(_) => warn!(font = %path.display(), "unusable font file"),
        }
    }

    Err(match configured {
        Some(path) => format!("cannot load {} or any system font", path.display()),
        None => "no TrueType font found; set `font` in the plot configuration".to_string(),
    })
}

/// `{plots_dir}/{benchmark}_{title lowercased, spaces replaced by _}.png`
pub fn plot_path(plots_dir: &Path, benchmark: &str, title: &str) -> PathBuf {
    plots_dir.join(format!(
        "{}_{}.png",
        benchmark,
        title.replace(' ', "_").to_lowercase()
    ))
}

/// Plottable points of one column: present, strictly positive values.
fn column_points(table: &MetricTable, column: &str) -> Vec<(f64, f64)> {
    table
        .column_cells(column)
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .filter_map(|(n, cell)| cell.value().map(|v| (n as f64, v)))
        .filter(|(_, v)| v.is_finite() && *v > 0.0)
        .collect()
}

/// Padded bounds for a log axis, `None` without positive values.
fn log_bounds(values: impl IntoIterator<Item = f64>, pad: f64) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;
    Some((lo / pad, hi * pad))
}

fn format_tick(value: f64) -> String {
    if value >= 1e5 || value < 1e-2 {
        format!("{:.0e}", value)
    } else if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Vertex offsets in pixels, y pointing down.
fn marker_outline(marker: Marker, size: f64) -> Vec<(i32, i32)> {
    let polygon = |corners: usize, radius: f64, phase: f64| -> Vec<(f64, f64)> {
        (0..corners)
            .map(|i| {
                let angle = phase + 2.0 * PI * i as f64 / corners as f64;
                (radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    };
    let cross = |arm: f64, half_width: f64, phase: f64| -> Vec<(f64, f64)> {
        let (a, t) = (arm, half_width);
        [
            (-t, -a), (t, -a), (t, -t), (a, -t), (a, t), (t, t),
            (t, a), (-t, a), (-t, t), (-a, t), (-a, -t), (-t, -t),
        ]
        .iter()
        .map(|&(x, y)| (x * phase.cos() - y * phase.sin(), x * phase.sin() + y * phase.cos()))
        .collect()
    };

    let up = -PI / 2.0;
    let points = match marker {
        Marker::Circle => polygon(16, size, 0.0),
        Marker::Square => polygon(4, size * 1.2, PI / 4.0),
        Marker::Diamond => polygon(4, size * 1.2, 0.0),
        Marker::ThinDiamond => vec![(0.0, -size * 1.3), (size * 0.6, 0.0), (0.0, size * 1.3), (-size * 0.6, 0.0)],
        Marker::TriangleUp => polygon(3, size * 1.2, up),
        Marker::TriangleDown => polygon(3, size * 1.2, -up),
        Marker::Star => (0..10)
            .map(|i| {
                let radius = if i % 2 == 0 { size * 1.4 } else { size * 0.6 };
                let angle = up + PI * i as f64 / 5.0;
                (radius * angle.cos(), radius * angle.sin())
            })
            .collect(),
        Marker::Plus => cross(size * 1.2, size * 0.35, 0.0),
        Marker::FilledX => cross(size * 1.3, size * 0.4, PI / 4.0),
        Marker::Cross => cross(size * 1.2, size * 0.2, PI / 4.0),
        Marker::Hexagon => polygon(6, size * 1.1, up),
        Marker::HexagonFlat => polygon(6, size * 1.1, 0.0),
    };

    points
        .into_iter()
        .map(|(x, y)| (x.round() as i32, y.round() as i32))
        .collect()
}

fn series_color(style: &SeriesStyle) -> RGBColor {
    let (r, g, b) = style.color;
    RGBColor(r, g, b)
}

/// Draw `table` as a log-log line chart and write it to
/// [`plot_path`], replacing any previous file.
///
/// Fails with [`ReportError::FontUnavailable`] before touching the file
/// system when no font can be registered.
pub fn render_plot(
    table: &MetricTable,
    benchmark: &str,
    plots_dir: &Path,
    config: &PlotConfig,
) -> Result<PathBuf> {
    ensure_font(config.font.as_deref())?;
    fs::create_dir_all(plots_dir).map_err(|err| {
        ReportError::Plot(format!("cannot create {}: {}", plots_dir.display(), err))
    })?;

    let path = plot_path(plots_dir, benchmark, table.metric.title());
    draw_chart(table, &path, config)?;
    debug!(path = %path.display(), columns = table.columns.len(), "wrote plot");
    Ok(path)
}

/// The bitmap is flushed when the backend is dropped at the end of this
/// function.
fn draw_chart(table: &MetricTable, path: &Path, config: &PlotConfig) -> Result<()> {
    let metric = table.metric;
    let series: Vec<(&str, SeriesStyle, Vec<(f64, f64)>)> = table
        .columns
        .iter()
        .map(|column| (column.as_str(), series_style(column), column_points(table, column)))
        .collect();

    let ticks: Vec<f64> = table
        .ns()
        .into_iter()
        .filter(|&n| n > 0)
        .map(|n| n as f64)
        .collect();
    let (x_lo, x_hi) = log_bounds(ticks.iter().copied(), 1.2).unwrap_or((1.0, 10.0));
    let (y_lo, y_hi) = log_bounds(
        series.iter().flat_map(|(_, _, points)| points.iter().map(|&(_, y)| y)),
        1.5,
    )
    .unwrap_or((1.0, 10.0));

    let per_row = series.len().div_ceil(2).max(1);
    let legend_rows = series.len().div_ceil(per_row) as u32;
    let legend_height = 30 + legend_rows * 36;

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let (chart_area, legend_area) =
        root.split_vertically(config.height.saturating_sub(legend_height));

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(metric.title(), (FONT_FAMILY, 36).into_font())
        .margin(24)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d(
            (x_lo..x_hi).log_scale().with_key_points(ticks),
            (y_lo..y_hi).log_scale(),
        )?;

    chart
        .configure_mesh()
        .x_desc("n")
        .y_desc(metric.axis_label())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format_tick(*y))
        .x_label_style((FONT_FAMILY, 18).into_font().transform(FontTransform::Rotate90))
        .y_label_style((FONT_FAMILY, 18).into_font())
        .axis_desc_style((FONT_FAMILY, 22).into_font())
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT)
        .draw()?;

    for (_, style, points) in &series {
        if points.is_empty() {
            continue;
        }
        let color = series_color(style);
        chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;

        let outline = marker_outline(style.marker, 7.0);
        chart.draw_series(points.iter().map(|&point| {
            EmptyElement::at(point) + Polygon::new(outline.clone(), color.filled())
        }))?;
    }

    let cell_width = (config.width.saturating_sub(40) / per_row as u32).max(1) as i32;
    for (i, (name, style, _)) in series.iter().enumerate() {
        let x = 20 + (i % per_row) as i32 * cell_width;
        let y = 20 + (i / per_row) as i32 * 36;
        let color = series_color(style);
        legend_area.draw(&PathElement::new(
            vec![(x, y), (x + 40, y)],
            color.stroke_width(2),
        ))?;
        legend_area.draw(
            &(EmptyElement::at((x + 20, y))
                + Polygon::new(marker_outline(style.marker, 7.0), color.filled())),
        )?;
        legend_area.draw(&Text::new(
            name.to_string(),
            (x + 52, y - 10),
            (FONT_FAMILY, 20).into_font(),
        ))?;
    }

    root.present()?;
    Ok(())
}
