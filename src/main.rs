use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use zkvm_bench_report::{generate_report, ReportConfig, Result};

#[derive(Parser)]
#[command(
    name = "zkvm-bench-report",
    about = "Combine zkVM benchmark results into tables, plots and a Markdown report"
)]
struct Cli {
    /// JSON configuration file; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with the per-tool CSV and JSON result files
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Directory with latest_commit.txt, timestamp.txt, os_version.txt,
    /// cpuinfo.txt and meminfo.txt
    #[arg(long)]
    info_dir: Option<PathBuf>,

    /// Report template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Output directory for the charts
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    /// Report file to write
    #[arg(long)]
    output: Option<PathBuf>,

    /// TrueType font used for chart text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Only report this benchmark case (repeatable)
    #[arg(long = "case", value_name = "NAME")]
    cases: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_json_file(path)?,
            None => ReportConfig::default(),
        };

        if let Some(dir) = self.results_dir {
            config.results_dir = dir;
        }
        if let Some(dir) = self.info_dir {
            config.info_dir = dir;
        }
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(dir) = self.plots_dir {
            config.plots_dir = dir;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(font) = self.font {
            config.plot.font = Some(font);
        }
        if !self.cases.is_empty() {
            config.cases = Some(self.cases);
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = Cli::parse().into_config().and_then(|config| generate_report(&config));
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "report generation failed");
            ExitCode::FAILURE
        }
    }
}
