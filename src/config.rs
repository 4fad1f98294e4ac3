//! Report configuration.
//!
//! Every field has a default so a bare invocation from the repository root
//! works; a JSON file and command-line flags override individual fields.

use crate::catalog::{find_case, BenchmarkCase, BENCHMARK_CASES};
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Chart rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// TrueType font for chart text; common system locations are searched
    /// when unset
    pub font: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1200,
            font: None,
        }
    }
}

/// Where results are read from and where the report goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory holding the per-tool CSV and JSON result files
    pub results_dir: PathBuf,

    /// Directory holding the machine metadata text files
    pub info_dir: PathBuf,

    /// Markdown template rendered with the report context
    pub template: PathBuf,

    /// Directory the charts are written to
    pub plots_dir: PathBuf,

    /// Report file
    pub output: PathBuf,

    /// Benchmark cases to report, by name; all cases when unset
    pub cases: Option<Vec<String>>,

    pub plot: PlotConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("benchmark_results"),
            info_dir: PathBuf::from("benchmark_results"),
            template: PathBuf::from("templates/report.md.j2"),
            plots_dir: PathBuf::from("plots"),
            output: PathBuf::from("index.md"),
            cases: None,
            plot: PlotConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Load a configuration file. Fields it leaves out keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| ReportError::InvalidConfig(format!(
            "{}: {}",
            path.display(),
            source
        )))
    }

    /// Check the configuration before any file is read or written.
    pub fn validate(&self) -> Result<()> {
        if !self.results_dir.is_dir() {
            return Err(ReportError::InvalidConfig(format!(
                "results directory {} does not exist",
                self.results_dir.display()
            )));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(ReportError::InvalidConfig(format!(
                "plot size {}x{} must be non-zero",
                self.plot.width, self.plot.height
            )));
        }
        self.selected_cases().map(|_| ())
    }

    /// Benchmark cases to report, in catalog order when unrestricted and
    /// in the configured order otherwise.
    pub fn selected_cases(&self) -> Result<Vec<&'static BenchmarkCase>> {
        match &self.cases {
            None => Ok(BENCHMARK_CASES.iter().collect()),
            Some(names) => names.iter().map(|name| find_case(name)).collect(),
        }
    }
}
