//! Unit conversions applied when result files are loaded.
//!
//! Prover time is reported in seconds, proof size in kilobytes and peak
//! memory in gigabytes. Proof size uses decimal kilobytes while memory uses
//! binary gigabytes, matching what the provers themselves print.

const MILLIS_PER_SEC: f64 = 1000.0;
const BYTES_PER_KB: f64 = 1000.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const KIB_PER_GIB: f64 = 1024.0 * 1024.0;

pub fn ms_to_secs(ms: f64) -> f64 {
    ms / MILLIS_PER_SEC
}

pub fn secs_to_ms(secs: f64) -> f64 {
    secs * MILLIS_PER_SEC
}

pub fn bytes_to_kb(bytes: f64) -> f64 {
    bytes / BYTES_PER_KB
}

pub fn kb_to_bytes(kb: f64) -> f64 {
    kb * BYTES_PER_KB
}

pub fn bytes_to_gb(bytes: f64) -> f64 {
    bytes / BYTES_PER_GB
}

pub fn gb_to_bytes(gb: f64) -> f64 {
    gb * BYTES_PER_GB
}

/// `/proc/meminfo` reports kibibytes.
pub fn kib_to_gib(kib: f64) -> f64 {
    kib / KIB_PER_GIB
}

/// Parse a memory size as written by heaptrack (`1.35G`, `512.00M`, `80K`)
/// or a plain byte count. Suffixes are 1024-based; a trailing `B` or `iB`
/// is accepted. Returns the size in bytes.
pub fn parse_memory_size(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let upper = trimmed.to_ascii_uppercase();
    let without_b = upper
        .strip_suffix("IB")
        .or_else(|| upper.strip_suffix('B'))
        .unwrap_or(&upper);

    let (number, multiplier) = match without_b.chars().last() {
        Some('K') => (&without_b[..without_b.len() - 1], 1024.0),
        Some('M') => (&without_b[..without_b.len() - 1], 1024.0 * 1024.0),
        Some('G') => (&without_b[..without_b.len() - 1], BYTES_PER_GB),
        Some('T') => (&without_b[..without_b.len() - 1], BYTES_PER_GB * 1024.0),
        _ => (without_b, 1.0),
    };

    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_conversions() {
        assert_eq!(ms_to_secs(1500.0), 1.5);
        assert_eq!(bytes_to_kb(2500.0), 2.5);
        assert_eq!(bytes_to_gb(2.0 * 1024.0 * 1024.0 * 1024.0), 2.0);
        assert_eq!(kib_to_gib(16.0 * 1024.0 * 1024.0), 16.0);
    }

    #[test]
    fn test_parse_memory_size() {
        assert_eq!(parse_memory_size("0"), Some(0.0));
        assert_eq!(parse_memory_size("4096"), Some(4096.0));
        assert_eq!(parse_memory_size("80K"), Some(80.0 * 1024.0));
        assert_eq!(parse_memory_size("512.00M"), Some(512.0 * 1024.0 * 1024.0));
        assert_eq!(parse_memory_size(" 2G "), Some(2.0 * BYTES_PER_GB));
        assert_eq!(parse_memory_size("1GiB"), Some(BYTES_PER_GB));
        assert_eq!(parse_memory_size("3MB"), Some(3.0 * 1024.0 * 1024.0));
        assert_eq!(parse_memory_size(""), None);
        assert_eq!(parse_memory_size("lots"), None);
        assert_eq!(parse_memory_size("-1"), None);
    }
}
