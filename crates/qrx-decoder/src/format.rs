use std::time::Duration;

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Decimal (1000-based) size, e.g. `66 B`, `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Throughput over `elapsed_ms`. Zero elapsed time reads as no throughput.
pub fn format_speed(bytes: u64, elapsed_ms: u64) -> String {
    if elapsed_ms == 0 {
        return format_bytes(0) + "/s";
    }
    // u128 keeps bytes * 1000 from overflowing
    let per_sec = (bytes as u128 * 1000 / elapsed_ms as u128) as u64;
    format_bytes(per_sec) + "/s"
}

pub fn format_duration(ms: u64) -> String {
    humantime::format_duration(Duration::from_millis(ms)).to_string()
}
