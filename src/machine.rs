//! Machine and environment metadata written next to the benchmark results.

use crate::error::{ReportError, Result};
use crate::units::kib_to_gib;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const COMMIT_FILE: &str = "latest_commit.txt";
pub const TIMESTAMP_FILE: &str = "timestamp.txt";
pub const OS_VERSION_FILE: &str = "os_version.txt";
pub const CPU_INFO_FILE: &str = "cpuinfo.txt";
pub const MEM_INFO_FILE: &str = "meminfo.txt";

/// `lscpu` fields shown in the report, in display order.
pub const CPU_KEYS: &[&str] = &[
    "Architecture",
    "CPU(s)",
    "Model name",
    "Thread(s) per core",
    "Core(s) per socket",
    "Socket(s)",
    "L3 cache",
];

/// `/proc/meminfo` fields shown in the report, in display order.
pub const MEM_KEYS: &[&str] = &["MemTotal", "MemFree", "MemAvailable"];

const UNKNOWN_OS: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineInfo {
    pub commit_hash: String,
    pub timestamp: String,
    pub os_version: String,
    pub cpu_info: Vec<InfoField>,
    pub mem_info: Vec<InfoField>,
}

impl MachineInfo {
    /// Read all five metadata files from `info_dir`.
    ///
    /// Any missing or unreadable file is an error; there is no partial
    /// result.
    pub fn read(info_dir: &Path) -> Result<Self> {
        let read = |name: &str| {
            let path = info_dir.join(name);
            fs::read_to_string(&path).map_err(|source| ReportError::MissingMetadata { path, source })
        };

        Ok(Self {
            commit_hash: first_line(&read(COMMIT_FILE)?),
            timestamp: first_line(&read(TIMESTAMP_FILE)?),
            os_version: pretty_name(&read(OS_VERSION_FILE)?),
            cpu_info: cpu_fields(&read(CPU_INFO_FILE)?),
            mem_info: mem_fields(&read(MEM_INFO_FILE)?),
        })
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}

/// `PRETTY_NAME` from an os-release file, quotes stripped.
fn pretty_name(text: &str) -> String {
    text.lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| UNKNOWN_OS.to_string())
}

/// `key: value` lines whose key is exactly one of `keys`, in `keys`
/// order. A key seen twice keeps its last value.
fn select_fields(text: &str, keys: &[&str]) -> Vec<(String, String)> {
    let mut found: Vec<Option<String>> = vec![None; keys.len()];
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if let Some(index) = keys.iter().position(|k| *k == key.trim()) {
            found[index] = Some(value.trim().to_string());
        }
    }

    keys.iter()
        .zip(found)
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}

fn cpu_fields(text: &str) -> Vec<InfoField> {
    select_fields(text, CPU_KEYS)
        .into_iter()
        .map(|(key, value)| InfoField { key, value })
        .collect()
}

fn mem_fields(text: &str) -> Vec<InfoField> {
    select_fields(text, MEM_KEYS)
        .into_iter()
        .map(|(key, value)| {
            let value = format_mem_value(&value);
            InfoField { key, value }
        })
        .collect()
}

/// `16384000 kB` becomes `15.62 GB`; anything unparsable is kept as is.
fn format_mem_value(raw: &str) -> String {
    let number = raw.trim().trim_end_matches("kB").trim();
    match number.parse::<f64>() {
        Ok(kib) => format!("{:.2} GB", kib_to_gib(kib)),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSCPU: &str = "\
Architecture:                    x86_64
CPU op-mode(s):                  32-bit, 64-bit
CPU(s):                          16
On-line CPU(s) list:             0-15
Model name:                      AMD Ryzen 7 7700X 8-Core Processor
Thread(s) per core:              2
Core(s) per socket:              8
Socket(s):                       1
CPU(s) scaling MHz:              54%
L2 cache:                        8 MiB (8 instances)
L3 cache:                        32 MiB (1 instance)
";

    fn write_info(dir: &Path) {
        fs::write(dir.join(COMMIT_FILE), "abc123\nsecond line\n").unwrap();
        fs::write(dir.join(TIMESTAMP_FILE), "2024-05-01 12:00:00\n").unwrap();
        fs::write(
            dir.join(OS_VERSION_FILE),
            "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\n",
        )
        .unwrap();
        fs::write(dir.join(CPU_INFO_FILE), LSCPU).unwrap();
        fs::write(
            dir.join(MEM_INFO_FILE),
            "MemTotal:       65536000 kB\nMemFree:        weird\nBuffers:  1 kB\nMemAvailable:   1048576 kB\n",
        )
        .unwrap();
    }

    #[test]
    fn test_read_machine_info() {
        let dir = tempfile::tempdir().unwrap();
        write_info(dir.path());

        let info = MachineInfo::read(dir.path()).unwrap();
        assert_eq!(info.commit_hash, "abc123");
        assert_eq!(info.timestamp, "2024-05-01 12:00:00");
        assert_eq!(info.os_version, "Ubuntu 22.04.4 LTS");

        let cpu: Vec<(&str, &str)> = info
            .cpu_info
            .iter()
            .map(|f| (f.key.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(cpu.len(), CPU_KEYS.len());
        assert_eq!(cpu[1], ("CPU(s)", "16"));
        assert_eq!(cpu[6], ("L3 cache", "32 MiB (1 instance)"));

        let mem: Vec<&str> = info.mem_info.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(mem, vec!["62.50 GB", "weird", "1.00 GB"]);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_info(dir.path());
        fs::remove_file(dir.path().join(MEM_INFO_FILE)).unwrap();

        match MachineInfo::read(dir.path()) {
            Err(ReportError::MissingMetadata { path, .. }) => {
                assert!(path.ends_with(MEM_INFO_FILE));
            }
            other => panic!("expected missing metadata, got {other:?}"),
        }
    }

    #[test]
    fn test_os_version_defaults_to_unknown() {
        assert_eq!(pretty_name("NAME=Arch\n"), "Unknown");
        assert_eq!(pretty_name("PRETTY_NAME=Debian\n"), "Debian");
    }
}
