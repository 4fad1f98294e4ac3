//! Static configuration: the benchmarked tools, the benchmark cases and
//! how each column is styled in plots.
//!
//! Column names are fixed. Base tools are always attempted, accelerated
//! variants only when the case asks for them and the tool has them.

use crate::error::{ReportError, Result};
use crate::types::Metric;

/// A benchmarked zkVM and the file prefixes its results are written under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Column name used in tables and plots.
    pub name: &'static str,
    /// Result file prefixes, tried in order.
    pub prefixes: &'static [&'static str],
    /// Has an accelerated (precompile) code path.
    pub precompile: bool,
    /// Has a builtin hardware-instruction code path.
    pub builtin: bool,
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec { name: "jolt", prefixes: &["jolt"], precompile: false, builtin: false },
    ToolSpec { name: "sp1", prefixes: &["sp1"], precompile: true, builtin: false },
    ToolSpec { name: "openvm", prefixes: &["openvm"], precompile: true, builtin: false },
    ToolSpec { name: "risc0", prefixes: &["risc0", "risczero"], precompile: true, builtin: false },
    ToolSpec { name: "stone", prefixes: &["stone"], precompile: false, builtin: true },
    ToolSpec { name: "stwo", prefixes: &["stwo"], precompile: true, builtin: false },
];

/// Columns that report no meaningful cycle count.
pub const CYCLE_COUNT_EXCLUDED: &[&str] = &["openvm", "openvm-precompile"];

/// Whether `column` belongs in the table for `metric`.
pub fn column_reports(column: &str, metric: Metric) -> bool {
    metric != Metric::CycleCount || !CYCLE_COUNT_EXCLUDED.contains(&column)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Precompile,
    Builtin,
}

impl Variant {
    /// Suffix in result file names and column names.
    pub fn suffix(self) -> &'static str {
        match self {
            Variant::Precompile => "precompile",
            Variant::Builtin => "builtin",
        }
    }
}

/// Rescaling of `n` for a builtin variant whose accelerator consumes a
/// fixed number of bytes per call, so its `n` lines up with the other
/// tools' byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    /// Single hash over `n` calls: `n * budget` bytes.
    PerCall { budget: u64 },
    /// Chain of hashes over `chunk`-byte inputs: `ceil(n * budget / chunk)`.
    Chained { budget: u64, chunk: u64 },
}

impl Rescale {
    pub fn apply(self, n: u64) -> u64 {
        match self {
            Rescale::PerCall { budget } => n.saturating_mul(budget),
            Rescale::Chained { budget, chunk } => {
                let scaled = n.saturating_mul(budget);
                scaled / chunk + u64::from(scaled % chunk != 0)
            }
        }
    }
}

/// One column of a combined table and where its data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub prefixes: &'static [&'static str],
    pub variant: Option<Variant>,
    pub rescale: Option<Rescale>,
}

impl ColumnSpec {
    pub fn base(tool: &ToolSpec) -> Self {
        Self {
            name: tool.name.to_string(),
            prefixes: tool.prefixes,
            variant: None,
            rescale: None,
        }
    }

    pub fn variant(tool: &ToolSpec, variant: Variant, rescale: Option<Rescale>) -> Self {
        Self {
            name: format!("{}-{}", tool.name, variant.suffix()),
            prefixes: tool.prefixes,
            variant: Some(variant),
            rescale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkCase {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Accelerated variants exist for this workload.
    pub precompile: bool,
    /// A builtin variant exists, with the rescaling it needs.
    pub builtin: Option<Rescale>,
    /// Column names never attempted for this case.
    pub skip: &'static [&'static str],
}

/// Bytes the Cairo keccak builtin absorbs per invocation.
const KECCAK_BUILTIN_BUDGET: u64 = 200;
/// Input size of each link in the sha3 chain benchmark.
const SHA3_CHAIN_CHUNK: u64 = 32;

pub const BENCHMARK_CASES: &[BenchmarkCase] = &[
    BenchmarkCase {
        name: "fib",
        title: "Fibonacci",
        description: "Benchmark `n` Fibonacci iterations.",
        precompile: false,
        builtin: None,
        skip: &[],
    },
    BenchmarkCase {
        name: "sha2",
        title: "Sha2",
        description: "Benchmark a Sha256 hash of `n` bytes.",
        precompile: true,
        builtin: None,
        skip: &[],
    },
    BenchmarkCase {
        name: "sha2-chain",
        title: "Sha2 Chain",
        description: "Benchmark a chain of `n` Sha256 hashes over 32-byte inputs.",
        precompile: true,
        builtin: None,
        skip: &[],
    },
    BenchmarkCase {
        name: "sha3",
        title: "Sha3",
        description: "Benchmark a Keccak256 hash of `n` bytes.",
        precompile: true,
        builtin: Some(Rescale::PerCall { budget: KECCAK_BUILTIN_BUDGET }),
        skip: &[],
    },
    BenchmarkCase {
        name: "sha3-chain",
        title: "Sha3 Chain",
        description: "Benchmark a chain of `n` Keccak256 hashes over 32-byte inputs.",
        precompile: true,
        builtin: Some(Rescale::Chained {
            budget: KECCAK_BUILTIN_BUDGET,
            chunk: SHA3_CHAIN_CHUNK,
        }),
        // The builtin column replaces the plain Cairo implementation.
        skip: &["stone"],
    },
    BenchmarkCase {
        name: "mat-mul",
        title: "Matrix Multiplication",
        description: "Benchmark multiplication of two `n x n` matrices.",
        precompile: false,
        builtin: None,
        skip: &[],
    },
    BenchmarkCase {
        name: "ec",
        title: "Elliptic Curve Addition",
        description: "Benchmark `n` secp256k1 point additions.",
        precompile: true,
        builtin: None,
        skip: &[],
    },
    BenchmarkCase {
        name: "blake",
        title: "Blake",
        description: "Benchmark a Blake2s hash of `n` bytes.",
        precompile: true,
        builtin: None,
        skip: &["stwo"],
    },
    BenchmarkCase {
        name: "blake-chain",
        title: "Blake Chain",
        description: "Benchmark a chain of `n` Blake2s hashes over 32-byte inputs.",
        precompile: true,
        builtin: None,
        skip: &["stwo"],
    },
];

impl BenchmarkCase {
    /// Every column attempted for this case, in join order.
    pub fn all_columns(&self) -> Vec<ColumnSpec> {
        let mut columns = Vec::new();

        for tool in TOOLS {
            columns.push(ColumnSpec::base(tool));

            if self.precompile && tool.precompile {
                columns.push(ColumnSpec::variant(tool, Variant::Precompile, None));
            }

            if let Some(rescale) = self.builtin {
                if tool.builtin {
                    columns.push(ColumnSpec::variant(tool, Variant::Builtin, Some(rescale)));
                }
            }
        }

        columns.retain(|column| !self.skip.contains(&column.name.as_str()));
        columns
    }

    /// Columns reported for `metric`, in join order.
    pub fn columns(&self, metric: Metric) -> Vec<ColumnSpec> {
        self.all_columns()
            .into_iter()
            .filter(|column| column_reports(&column.name, metric))
            .collect()
    }

    /// Name of this case's section in the report template, e.g.
    /// `sha2_chain_data`.
    pub fn template_key(&self) -> String {
        format!("{}_data", self.name.replace('-', "_"))
    }
}

pub fn find_case(name: &str) -> Result<&'static BenchmarkCase> {
    BENCHMARK_CASES
        .iter()
        .find(|case| case.name == name)
        .ok_or_else(|| ReportError::UnknownCase(name.to_string()))
}

/// Marker shapes available to the plot renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Diamond,
    ThinDiamond,
    TriangleUp,
    TriangleDown,
    Star,
    Plus,
    Cross,
    FilledX,
    Hexagon,
    HexagonFlat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub marker: Marker,
    pub color: (u8, u8, u8),
}

const FALLBACK_STYLE: SeriesStyle = SeriesStyle {
    marker: Marker::Cross,
    color: (0x80, 0x80, 0x80),
};

const STYLES: &[(&str, SeriesStyle)] = &[
    ("jolt", SeriesStyle { marker: Marker::Circle, color: (0x64, 0x41, 0x72) }),
    ("risc0", SeriesStyle { marker: Marker::Square, color: (0x00, 0xFF, 0x00) }),
    ("sp1", SeriesStyle { marker: Marker::Diamond, color: (0xFE, 0x11, 0xC5) }),
    ("stone", SeriesStyle { marker: Marker::TriangleUp, color: (0x23, 0x6B, 0x8E) }),
    ("stwo", SeriesStyle { marker: Marker::TriangleDown, color: (0xEC, 0x56, 0x31) }),
    ("risc0-precompile", SeriesStyle { marker: Marker::Star, color: (0x69, 0x9C, 0x52) }),
    ("sp1-precompile", SeriesStyle { marker: Marker::Plus, color: (0xDC, 0x75, 0xCD) }),
    ("stone-builtin", SeriesStyle { marker: Marker::Hexagon, color: (0x58, 0xC4, 0xDD) }),
    ("stwo-precompile", SeriesStyle { marker: Marker::HexagonFlat, color: (0xF2, 0x80, 0x6B) }),
    ("openvm", SeriesStyle { marker: Marker::FilledX, color: (0x50, 0x50, 0x50) }),
    ("openvm-precompile", SeriesStyle { marker: Marker::ThinDiamond, color: (0xA0, 0xA0, 0xA0) }),
];

/// Fixed style for a column; unknown names get a gray cross.
pub fn series_style(column: &str) -> SeriesStyle {
    STYLES
        .iter()
        .find(|(name, _)| *name == column)
        .map_or(FALLBACK_STYLE, |(_, style)| *style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(case: &str, metric: Metric) -> Vec<String> {
        find_case(case)
            .unwrap()
            .columns(metric)
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn test_rescale_rules() {
        let chained = Rescale::Chained { budget: 200, chunk: 32 };
        assert_eq!(chained.apply(32), 200);
        assert_eq!(chained.apply(37), 232);
        assert_eq!(chained.apply(0), 0);

        let per_call = Rescale::PerCall { budget: 200 };
        assert_eq!(per_call.apply(5), 1000);
    }

    #[test]
    fn test_base_columns_only_without_flags() {
        assert_eq!(
            names("fib", Metric::ProverTime),
            vec!["jolt", "sp1", "openvm", "risc0", "stone", "stwo"]
        );
    }

    #[test]
    fn test_precompile_columns_follow_their_tool() {
        assert_eq!(
            names("sha2", Metric::ProverTime),
            vec![
                "jolt",
                "sp1",
                "sp1-precompile",
                "openvm",
                "openvm-precompile",
                "risc0",
                "risc0-precompile",
                "stone",
                "stwo",
                "stwo-precompile",
            ]
        );
    }

    #[test]
    fn test_builtin_column_and_skips() {
        let sha3 = names("sha3", Metric::ProverTime);
        assert!(sha3.contains(&"stone".to_string()));
        assert!(sha3.contains(&"stone-builtin".to_string()));

        let chain = names("sha3-chain", Metric::ProverTime);
        assert!(!chain.contains(&"stone".to_string()));
        assert!(chain.contains(&"stone-builtin".to_string()));

        let blake = names("blake", Metric::ProverTime);
        assert!(!blake.contains(&"stwo".to_string()));
        assert!(blake.contains(&"stwo-precompile".to_string()));
    }

    #[test]
    fn test_cycle_count_drops_openvm() {
        let columns = names("sha2", Metric::CycleCount);
        assert!(!columns.iter().any(|c| c.starts_with("openvm")));
        assert!(columns.contains(&"sp1-precompile".to_string()));
    }

    #[test]
    fn test_builtin_column_carries_rescale() {
        let case = find_case("sha3-chain").unwrap();
        let builtin = case
            .columns(Metric::ProofSize)
            .into_iter()
            .find(|c| c.variant == Some(Variant::Builtin))
            .unwrap();
        assert_eq!(builtin.prefixes, &["stone"]);
        assert_eq!(builtin.rescale, Some(Rescale::Chained { budget: 200, chunk: 32 }));
    }

    #[test]
    fn test_styles_and_fallback() {
        assert_eq!(series_style("jolt").marker, Marker::Circle);
        assert_eq!(series_style("stone-builtin").color, (0x58, 0xC4, 0xDD));
        assert_eq!(series_style("zisk"), FALLBACK_STYLE);
    }

    #[test]
    fn test_case_lookup() {
        assert_eq!(find_case("mat-mul").unwrap().template_key(), "mat_mul_data");
        assert!(matches!(find_case("nope"), Err(ReportError::UnknownCase(_))));
    }
}
