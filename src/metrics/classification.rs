use std::collections::BTreeMap;

use super::*;
use crate::coerce::normalize_label;

/// expected label -> actual label -> count. Cells never observed are absent.
pub type ConfusionMatrix = BTreeMap<String, BTreeMap<String, usize>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
    pub predicted_count: usize,
    pub true_positives: usize,
}

impl Labeled for ClassMetrics {
    fn key(&self) -> &str {
        &self.label
    }
}

pub fn entity_type_accuracy(completed: &[&ResultRow]) -> f64 {
    flag_rate(completed, |row| row.entity_type_correct)
}

/// One entry per configured label, in configuration order. Labels never seen
/// in the data still get an entry with zero support.
pub fn class_metrics(completed: &[&ResultRow], labels: &[String]) -> Vec<ClassMetrics> {
    labels
        .iter()
        .map(|label| single_class_metrics(completed, &normalize_label(label)))
        .collect()
}

fn single_class_metrics(completed: &[&ResultRow], label: &str) -> ClassMetrics {
    let predicted = completed
        .iter()
        .filter(|row| row.actual_entity_type == label)
        .collect::<Vec<_>>();
    let support = completed
        .iter()
        .filter(|row| row.expected_entity_type == label)
        .count();
    let true_positives = predicted
        .iter()
        .filter(|row| row.entity_type_correct)
        .count();

    let precision = ratio(true_positives, predicted.len());
    let recall = ratio(true_positives, support);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        label: label.to_string(),
        precision,
        recall,
        f1,
        support,
        predicted_count: predicted.len(),
        true_positives,
    }
}

pub fn confusion_matrix(completed: &[&ResultRow]) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::new();
    for row in completed {
        *matrix
            .entry(row.expected_entity_type.clone())
            .or_default()
            .entry(row.actual_entity_type.clone())
            .or_default() += 1;
    }
    matrix
}

/// Mean F1 over labels that have at least one expected row.
pub fn macro_f1(metrics: &[ClassMetrics]) -> Option<f64> {
    mean(
        metrics
            .iter()
            .filter(|class| class.support > 0)
            .map(|class| class.f1)
            .collect::<Vec<f64>>()
            .into_iter(),
    )
}
