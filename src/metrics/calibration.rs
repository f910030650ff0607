use super::*;

struct BinSpec {
    label: &'static str,
    lower: f64,
    upper: f64,
    midpoint: f64,
}

/// Half-open bins except the last, which also takes 1.0 and anything above.
/// Midpoints are fixed stand-ins for the bin's expected confidence.
const BINS: [BinSpec; 4] = [
    BinSpec {
        label: "0.0-0.5",
        lower: 0.0,
        upper: 0.5,
        midpoint: 0.25,
    },
    BinSpec {
        label: "0.5-0.7",
        lower: 0.5,
        upper: 0.7,
        midpoint: 0.6,
    },
    BinSpec {
        label: "0.7-0.9",
        lower: 0.7,
        upper: 0.9,
        midpoint: 0.8,
    },
    BinSpec {
        label: "0.9-1.0",
        lower: 0.9,
        upper: 1.0,
        midpoint: 0.95,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBin {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub midpoint: f64,
    pub count: usize,
    pub correct: usize,
}

impl ConfidenceBin {
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.count)
    }
}

impl Labeled for ConfidenceBin {
    fn key(&self) -> &str {
        self.label
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationSummary {
    pub avg_confidence: f64,
    pub confidence_calibration_rate: f64,
    #[serde(serialize_with = "super::serialize_by_label")]
    pub confidence_bins: Vec<ConfidenceBin>,
    pub expected_calibration_error: f64,
}

pub fn summarize_calibration(completed: &[&ResultRow]) -> CalibrationSummary {
    let mut bins = BINS
        .iter()
        .map(|template| ConfidenceBin {
            label: template.label,
            lower: template.lower,
            upper: template.upper,
            midpoint: template.midpoint,
            count: 0,
            correct: 0,
        })
        .collect::<Vec<ConfidenceBin>>();

    for row in completed {
        let bin = &mut bins[bin_index(row.confidence)];
        bin.count += 1;
        if row.entity_type_correct {
            bin.correct += 1;
        }
    }

    let expected_calibration_error = expected_calibration_error(&bins, completed.len());

    CalibrationSummary {
        avg_confidence: mean(completed.iter().map(|row| row.confidence)).unwrap_or(0.0),
        confidence_calibration_rate: flag_rate(completed, |row| row.confidence_calibrated),
        confidence_bins: bins,
        expected_calibration_error,
    }
}

fn bin_index(confidence: f64) -> usize {
    BINS.iter()
        .position(|template| confidence < template.upper)
        .unwrap_or(BINS.len() - 1)
}

/// Sum over non-empty bins of |bin accuracy - bin midpoint| weighted by the
/// bin's share of completed rows.
fn expected_calibration_error(bins: &[ConfidenceBin], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    bins.iter()
        .filter(|bin| bin.count > 0)
        .map(|bin| (bin.accuracy() - bin.midpoint).abs() * (bin.count as f64 / total as f64))
        .sum()
}
