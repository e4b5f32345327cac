//! Counter unit conversions
//!
//! Throughput counters arrive in KiB/s (volumes, disks, FC ports) or MiB
//! (dashboard, cache sizes). Integer inputs are converted with exact integer
//! arithmetic; fractional inputs are scaled and truncated. Thousands separators
//! are ignored.

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * 1024;

/// Parses a raw counter, ignoring thousands separators.
pub fn parse_counter(raw: &str) -> Option<u64> {
    raw.trim().replace(',', "").parse::<u64>().ok()
}

/// Multiplies a raw counter by `factor`.
pub fn scale(raw: &str, factor: u64) -> Option<u64> {
    let cleaned = raw.trim().replace(',', "");
    if let Ok(whole) = cleaned.parse::<u64>() {
        return whole.checked_mul(factor);
    }
    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * factor as f64) as u64)
}

/// Counters reported in their own unit (IOPS, latency), truncated to whole units.
pub fn whole(raw: &str) -> Option<u64> {
    scale(raw, 1)
}

pub fn kib_to_bytes(raw: &str) -> Option<u64> {
    scale(raw, KIB)
}

pub fn mib_to_bytes(raw: &str) -> Option<u64> {
    scale(raw, MIB)
}

/// Percentage of `hits` in `total`, rounded half to even. Zero when `total` is zero.
pub fn hit_ratio(hits: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (hits as f64 / (total as f64 / 100.0)).round_ties_even() as u64
}
