//! Report assembly: metadata, tables and plots substituted into a
//! `minijinja` template.

use crate::catalog::BenchmarkCase;
use crate::combine::{CaseResults, MetricTable};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::machine::{InfoField, MachineInfo};
use crate::render::{render_plot, render_table};
use minijinja::Environment;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Tables and plots of one benchmark case as the template sees them.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSection {
    pub name: String,
    pub title: String,
    pub description: String,
    /// Markdown table per metric key (`prover_time`, ...).
    pub tables: BTreeMap<String, String>,
    /// Plot path per `{metric}_plot` key. Charts that failed to render
    /// are absent.
    pub plots: BTreeMap<String, String>,
}

impl BenchmarkSection {
    fn new(case: &BenchmarkCase) -> Self {
        Self {
            name: case.name.to_string(),
            title: case.title.to_string(),
            description: case.description.to_string(),
            tables: BTreeMap::new(),
            plots: BTreeMap::new(),
        }
    }
}

/// Everything the template can reference.
///
/// Besides the `benchmarks` list every section is also exposed under its
/// own `{case}_data` name, e.g. `sha2_chain_data.tables.prover_time`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub commit_hash: String,
    pub time: String,
    pub os_version: String,
    pub cpu_info: Vec<InfoField>,
    pub mem_info: Vec<InfoField>,
    pub benchmarks: Vec<BenchmarkSection>,
    #[serde(flatten)]
    pub sections: BTreeMap<String, BenchmarkSection>,
}

impl ReportContext {
    pub fn new(machine: MachineInfo) -> Self {
        Self {
            commit_hash: machine.commit_hash,
            time: machine.timestamp,
            os_version: machine.os_version,
            cpu_info: machine.cpu_info,
            mem_info: machine.mem_info,
            benchmarks: Vec::new(),
            sections: BTreeMap::new(),
        }
    }

    pub fn push_section(&mut self, case: &BenchmarkCase, section: BenchmarkSection) {
        self.sections.insert(case.template_key(), section.clone());
        self.benchmarks.push(section);
    }
}

/// How a plot path is written into the report: relative to the report's
/// directory when possible, with `/` separators.
fn link_path(plot: &Path, report_dir: &Path) -> String {
    match plot.strip_prefix(report_dir) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => plot.display().to_string(),
    }
}

/// Render the tables and plots of one case. Charts that cannot be drawn
/// are logged and left out of the section.
pub fn build_section(
    case: &'static BenchmarkCase,
    tables: &[MetricTable],
    config: &ReportConfig,
) -> Result<BenchmarkSection> {
    let report_dir = config.output.parent().unwrap_or_else(|| Path::new(""));
    let mut section = BenchmarkSection::new(case);

    for table in tables {
        let key = table.metric.key();
        section.tables.insert(key.to_string(), render_table(table));

        match render_plot(table, case.name, &config.plots_dir, &config.plot) {
            Ok(path) => {
                section
                    .plots
                    .insert(format!("{key}_plot"), link_path(&path, report_dir));
            }
            Err(err) if err.is_recoverable() => {
                warn!(benchmark = case.name, metric = %table.metric, error = %err, "skipping plot");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(section)
}

pub fn render_report(template: &str, context: &ReportContext) -> Result<String> {
    let env = Environment::new();
    Ok(env.render_str(template, context)?)
}

/// Run the whole pipeline and write the report.
///
/// Metadata and the template are read before any result file. The report
/// is rendered in memory, so on any fatal error no output file is created.
pub fn generate_report(config: &ReportConfig) -> Result<PathBuf> {
    config.validate()?;
    let cases = config.selected_cases()?;

    let machine = MachineInfo::read(&config.info_dir)?;
    let template = fs::read_to_string(&config.template).map_err(|source| {
        ReportError::MissingTemplate {
            path: config.template.clone(),
            source,
        }
    })?;

    let mut context = ReportContext::new(machine);
    for case in cases {
        let results = CaseResults::load(&config.results_dir, case);
        let section = build_section(case, &results.tables(), config)?;
        context.push_section(case, section);
    }

    let report = render_report(&template, &context)?;
    fs::write(&config.output, report)?;
    info!(path = %config.output.display(), "wrote report");
    Ok(config.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_case;
    use crate::combine::{combine, Series};
    use crate::types::{Cell, Metric};

    fn machine() -> MachineInfo {
        MachineInfo {
            commit_hash: "abc123".into(),
            timestamp: "now".into(),
            os_version: "Linux".into(),
            cpu_info: vec![InfoField { key: "CPU(s)".into(), value: "16".into() }],
            mem_info: vec![InfoField { key: "MemTotal".into(), value: "62.50 GB".into() }],
        }
    }

    #[test]
    fn test_context_exposes_named_sections() {
        let case = find_case("sha2-chain").unwrap();
        let mut section = BenchmarkSection::new(case);
        section.tables.insert("prover_time".into(), "| n |".into());
        section.plots.insert("prover_time_plot".into(), "plots/x.png".into());

        let mut context = ReportContext::new(machine());
        context.push_section(case, section);

        let template = "{{ commit_hash }} {{ os_version }}\n\
{% for f in cpu_info %}{{ f.key }}={{ f.value }}{% endfor %}\n\
{{ sha2_chain_data.tables.prover_time }} {{ sha2_chain_data.plots.prover_time_plot }}\n\
{% for b in benchmarks %}{{ b.title }}{% endfor %}";
        let out = render_report(template, &context).unwrap();
        assert_eq!(out, "abc123 Linux\nCPU(s)=16\n| n | plots/x.png\nSha2 Chain");
    }

    #[test]
    fn test_invalid_template_is_an_error() {
        let context = ReportContext::new(machine());
        assert!(matches!(
            render_report("{% for %}", &context),
            Err(ReportError::Template(_))
        ));
    }

    #[test]
    fn test_link_path_is_relative_to_report() {
        assert_eq!(
            link_path(Path::new("/out/plots/fib_a.png"), Path::new("/out")),
            "plots/fib_a.png"
        );
        assert_eq!(link_path(Path::new("plots/fib_a.png"), Path::new("")), "plots/fib_a.png");
    }

    #[test]
    fn test_section_keeps_tables_when_plots_fail() {
        let dir = tempfile::tempdir().unwrap();
        let case = find_case("fib").unwrap();
        let series: Series = [(1, Cell::Present(1.0))].into_iter().collect();
        let tables = vec![combine(Metric::ProverTime, vec![("jolt", series)])];
        let config = ReportConfig {
            plots_dir: dir.path().join("plots"),
            output: dir.path().join("index.md"),
            ..ReportConfig::default()
        };

        let section = build_section(case, &tables, &config).unwrap();
        assert!(section.tables["prover_time"].contains("| jolt |"));
        if let Some(path) = section.plots.get("prover_time_plot") {
            assert_eq!(path, "plots/fib_prover_time_vs_n.png");
        }
    }
}
