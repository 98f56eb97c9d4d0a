/// Nearest-rank percentile. Returns 0 for an empty list.
pub fn percentile(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let rank = (pct / 100.0 * sorted.len() as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    sorted[idx]
}

pub fn mean_rounded(sum: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u64
}

/// `hits / (hits + misses)` as a whole percentage; 100 when nothing was attempted.
pub fn accuracy_percent(hits: u32, misses: u32) -> u32 {
    let total = hits + misses;
    if total == 0 {
        return 100;
    }
    (hits as f64 / total as f64 * 100.0).round() as u32
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
