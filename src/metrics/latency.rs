use super::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    /// Raw samples in input order; console output only.
    #[serde(skip)]
    pub samples: Vec<f64>,
}

pub fn summarize_latency(completed: &[&ResultRow]) -> Option<LatencySummary> {
    let samples = completed
        .iter()
        .map(|row| row.latency_ms)
        .collect::<Vec<f64>>();

    let mut sorted = samples.clone();
    sorted.sort_by(|left, right| left.total_cmp(right));

    Some(LatencySummary {
        avg_latency_ms: mean(samples.iter().copied())?,
        p50_latency_ms: nearest_rank(&sorted, 0.50)?,
        p95_latency_ms: nearest_rank(&sorted, 0.95)?,
        p99_latency_ms: nearest_rank(&sorted, 0.99)?,
        samples,
    })
}

/// Element at `floor(n * quantile)` of an ascending sample, clamped to the
/// last index. No interpolation.
pub fn nearest_rank(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let index = ((sorted.len() as f64) * quantile.clamp(0.0, 1.0)).floor() as usize;
    sorted.get(index.min(sorted.len() - 1)).copied()
}
