use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The five metrics every benchmark case is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ProverTime,
    VerifierTime,
    ProofSize,
    CycleCount,
    PeakMemory,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::ProverTime,
        Metric::VerifierTime,
        Metric::ProofSize,
        Metric::CycleCount,
        Metric::PeakMemory,
    ];

    /// Key used for this metric's table in the report template.
    pub fn key(self) -> &'static str {
        match self {
            Metric::ProverTime => "prover_time",
            Metric::VerifierTime => "verifier_time",
            Metric::ProofSize => "proof_size",
            Metric::CycleCount => "cycle_count",
            Metric::PeakMemory => "peak_memory",
        }
    }

    /// Column header in the CSV result layout.
    pub fn csv_column(self) -> &'static str {
        match self {
            Metric::ProverTime => "prover time(ms)",
            Metric::VerifierTime => "verifier time(ms)",
            Metric::ProofSize => "proof size(bytes)",
            Metric::CycleCount => "cycle count",
            Metric::PeakMemory => "peak memory",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::ProverTime => "Prover Time vs n",
            Metric::VerifierTime => "Verifier Time vs n",
            Metric::ProofSize => "Proof Size vs n",
            Metric::CycleCount => "Cycle Count vs n",
            Metric::PeakMemory => "Peak Memory vs n",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Metric::ProverTime => "Prover Time (s)",
            Metric::VerifierTime => "Verifier Time (ms)",
            Metric::ProofSize => "Proof Size (KB)",
            Metric::CycleCount => "Cycle Count",
            Metric::PeakMemory => "Peak Memory (GB)",
        }
    }

    /// Digits after the decimal point in rendered tables.
    pub fn decimals(self) -> usize {
        match self {
            Metric::CycleCount => 0,
            _ => 2,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a benchmarked tool produced no numbers for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Killed for running out of memory (or another resource).
    ResourceExhausted,
    /// Any other crash or error exit.
    Error,
}

/// A failed run as reported by the benchmark harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// Payload of the `failure` object, kept verbatim.
    pub payload: Value,
}

/// Signal the kernel OOM killer delivers.
const KILL_SIGNAL: i64 = 9;

impl Failure {
    /// Classify a harness failure payload by its structured fields.
    ///
    /// `{"signal": 9}`, `{"signal": "SIGKILL"}`, `{"reason": "oom"}`,
    /// `{"kind": "out_of_memory"}` and `{"out_of_memory": true}` count as
    /// resource exhaustion, either at the top level or one object below
    /// it (`{"status": {"signal": 9}}`). Everything else, including
    /// non-object payloads, is a plain error.
    pub fn classify(payload: Value) -> Self {
        let kind = match &payload {
            Value::Object(fields) => {
                let nested = fields.values().filter_map(Value::as_object);
                if std::iter::once(fields).chain(nested).any(reports_oom) {
                    FailureKind::ResourceExhausted
                } else {
                    FailureKind::Error
                }
            }
            _ => FailureKind::Error,
        };

        Self { kind, payload }
    }

    pub fn is_resource_exhausted(&self) -> bool {
        self.kind == FailureKind::ResourceExhausted
    }
}

fn reports_oom(fields: &serde_json::Map<String, Value>) -> bool {
    let killed = fields.get("signal").map_or(false, is_kill_signal);
    let oom_reason = ["reason", "kind"].iter().any(|key| {
        fields
            .get(*key)
            .and_then(Value::as_str)
            .map_or(false, is_oom_reason)
    });
    let oom_flag = fields
        .get("out_of_memory")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    killed || oom_reason || oom_flag
}

fn is_kill_signal(signal: &Value) -> bool {
    match signal {
        Value::Number(n) => n.as_i64() == Some(KILL_SIGNAL),
        Value::String(s) => {
            let s = s.trim().to_ascii_uppercase();
            s == "9" || s == "SIGKILL" || s == "KILL"
        }
        _ => false,
    }
}

fn is_oom_reason(reason: &str) -> bool {
    let reason = reason.trim().to_ascii_lowercase();
    matches!(reason.as_str(), "oom" | "out_of_memory" | "out-of-memory" | "outofmemory")
}

/// One cell of a metric table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Present(f64),
    /// The tool has no data for this `n`.
    Missing,
    Failed(Failure),
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Present(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Cell::Missing, Cell::Present)
    }
}

/// Everything one result file (or CSV row) says about a single `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub n: u64,
    pub prover_time: Cell,
    pub verifier_time: Cell,
    pub proof_size: Cell,
    pub cycle_count: Cell,
    pub peak_memory: Cell,
}

impl RunRecord {
    /// A record with the same failure in every metric.
    pub fn failed(n: u64, failure: Failure) -> Self {
        Self {
            n,
            prover_time: Cell::Failed(failure.clone()),
            verifier_time: Cell::Failed(failure.clone()),
            proof_size: Cell::Failed(failure.clone()),
            cycle_count: Cell::Failed(failure.clone()),
            peak_memory: Cell::Failed(failure),
        }
    }

    pub fn cell(&self, metric: Metric) -> &Cell {
        match metric {
            Metric::ProverTime => &self.prover_time,
            Metric::VerifierTime => &self.verifier_time,
            Metric::ProofSize => &self.proof_size,
            Metric::CycleCount => &self.cycle_count,
            Metric::PeakMemory => &self.peak_memory,
        }
    }

    pub fn is_failure(&self) -> bool {
        Metric::ALL
            .iter()
            .all(|m| matches!(self.cell(*m), Cell::Failed(_)))
    }
}
