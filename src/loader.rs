//! Result file loading.
//!
//! Two layouts are understood. The CSV layout keeps one file per tool and
//! benchmark, `{prefix}-{benchmark}[-{variant}].csv`, with one row per `n`.
//! The JSON layout keeps one file per run,
//! `{prefix}-{benchmark}[-{variant}]-n{n}.json`, holding either a `success`
//! or a `failure` result. Units are normalized here so that every later
//! stage works in seconds, kilobytes and gigabytes.

use crate::catalog::{ColumnSpec, Variant};
use crate::error::{ReportError, Result};
use crate::types::{Cell, Failure, Metric, RunRecord};
use crate::units::{bytes_to_gb, bytes_to_kb, ms_to_secs, parse_memory_size};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ResultFile {
    config: RunConfig,
    result: RunOutcome,
}

#[derive(Debug, Deserialize)]
struct RunConfig {
    n: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RunOutcome {
    Success(SuccessResult),
    Failure(Value),
}

#[derive(Debug, Deserialize)]
struct SuccessResult {
    #[serde(default)]
    prover_durations_ms: Vec<f64>,
    #[serde(default)]
    verifier_durations_ms: Vec<f64>,
    proof_size_bytes: f64,
    cycle_count: f64,
    #[serde(default)]
    peak_memory_bytes: Option<f64>,
}

/// Convert a raw value from a result file into the unit the report uses.
pub fn normalize(metric: Metric, raw: f64) -> f64 {
    match metric {
        Metric::ProverTime => ms_to_secs(raw),
        Metric::ProofSize => bytes_to_kb(raw),
        Metric::PeakMemory => bytes_to_gb(raw),
        Metric::VerifierTime | Metric::CycleCount => raw,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// File name stem shared by both layouts, e.g. `sp1-sha2-precompile`.
pub fn result_stem(prefix: &str, benchmark: &str, variant: Option<Variant>) -> String {
    match variant {
        Some(variant) => format!("{prefix}-{benchmark}-{}", variant.suffix()),
        None => format!("{prefix}-{benchmark}"),
    }
}

/// Parse one per-run JSON result file.
///
/// A `failure` result becomes a record whose every cell is
/// [`Cell::Failed`] with the payload preserved. A missing file is an
/// error, never a failed record.
pub fn read_json_result(path: &Path) -> Result<RunRecord> {
    let contents = fs::read_to_string(path)?;
    parse_json_result(&contents, path)
}

fn parse_json_result(contents: &str, path: &Path) -> Result<RunRecord> {
    let file: ResultFile = serde_json::from_str(contents).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let n = file.config.n;

    let success = match file.result {
        RunOutcome::Success(success) => success,
        RunOutcome::Failure(payload) => {
            let failure = Failure::classify(payload);
            debug!(path = %path.display(), n, kind = ?failure.kind, "run reported a failure");
            return Ok(RunRecord::failed(n, failure));
        }
    };

    let cell = |metric: Metric, raw: Option<f64>| {
        Cell::from_option(raw.filter(|v| v.is_finite()).map(|v| normalize(metric, v)))
    };

    Ok(RunRecord {
        n,
        prover_time: cell(Metric::ProverTime, mean(&success.prover_durations_ms)),
        verifier_time: cell(Metric::VerifierTime, mean(&success.verifier_durations_ms)),
        proof_size: cell(Metric::ProofSize, Some(success.proof_size_bytes)),
        cycle_count: cell(Metric::CycleCount, Some(success.cycle_count)),
        peak_memory: cell(Metric::PeakMemory, success.peak_memory_bytes),
    })
}

fn parse_n(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    // pandas round-trips integer columns with gaps as floats ("64.0").
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}

fn parse_metric(metric: Metric, raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return None;
    }
    let value = match metric {
        Metric::PeakMemory => parse_memory_size(raw)?,
        _ => raw.parse::<f64>().ok().filter(|v| v.is_finite())?,
    };
    Some(normalize(metric, value))
}

/// Parse a CSV result file. Rows without a usable `n` are dropped; a
/// missing, unparsable or truncated metric only blanks that metric.
pub fn read_csv_results(path: &Path) -> Result<Vec<RunRecord>> {
    let csv_error = |source: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let n_index = position("n").ok_or_else(|| ReportError::MalformedResult {
        path: path.to_path_buf(),
        reason: "no `n` column".to_string(),
    })?;
    let metric_index: BTreeMap<Metric, usize> = Metric::ALL
        .iter()
        .filter_map(|&metric| position(metric.csv_column()).map(|i| (metric, i)))
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;

        let Some(n) = row.get(n_index).and_then(parse_n) else {
            debug!(path = %path.display(), "dropping row without n");
            continue;
        };

        let cell = |metric: Metric| {
            Cell::from_option(
                metric_index
                    .get(&metric)
                    .and_then(|&i| row.get(i))
                    .and_then(|raw| parse_metric(metric, raw)),
            )
        };

        records.push(RunRecord {
            n,
            prover_time: cell(Metric::ProverTime),
            verifier_time: cell(Metric::VerifierTime),
            proof_size: cell(Metric::ProofSize),
            cycle_count: cell(Metric::CycleCount),
            peak_memory: cell(Metric::PeakMemory),
        });
    }

    records.sort_by_key(|r| r.n);
    Ok(records)
}

/// Per-run JSON files for `stem`, sorted by path.
fn json_result_files(results_dir: &Path, stem: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(results_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %results_dir.display(), error = %err, "cannot list results directory");
            return Vec::new();
        }
    };

    let run_prefix = format!("{stem}-n");
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix(&run_prefix))
                .and_then(|rest| rest.strip_suffix(".json"))
                .map_or(false, |digits| {
                    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                })
        })
        .collect();
    paths.sort();
    paths
}

/// Load every result for one column of one benchmark, keyed by the raw
/// `n` the tool reported.
///
/// Unreadable files are logged and skipped. When both layouts cover the
/// same `n`, the JSON run wins; earlier prefixes win over later (legacy)
/// ones. A column with no files yields an empty map.
pub fn load_column(results_dir: &Path, benchmark: &str, column: &ColumnSpec) -> BTreeMap<u64, RunRecord> {
    let mut records = BTreeMap::new();

    for prefix in column.prefixes.iter().rev() {
        let stem = result_stem(prefix, benchmark, column.variant);

        let csv_path = results_dir.join(format!("{stem}.csv"));
        if csv_path.is_file() {
            match read_csv_results(&csv_path) {
                Ok(rows) => records.extend(rows.into_iter().map(|r| (r.n, r))),
                Err(err) => warn!(path = %csv_path.display(), error = %err, "skipping result file"),
            }
        }

        for path in json_result_files(results_dir, &stem) {
            match read_json_result(&path) {
                Ok(record) => {
                    records.insert(record.n, record);
                }
                Err(err) => warn!(path = %path.display(), error = %err, "skipping result file"),
            }
        }
    }

    if records.is_empty() {
        debug!(benchmark, column = %column.name, "no results found");
    } else {
        debug!(benchmark, column = %column.name, runs = records.len(), "loaded results");
    }
    records
}
