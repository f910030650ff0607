use super::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAccuracySummary {
    pub title_keyword_overlap_avg: f64,
    pub start_time_presence_accuracy: f64,
    pub start_hour_accuracy: f64,
    /// `None` when no completed row carried a usable hour error.
    pub avg_hour_error: Option<f64>,
    pub end_time_presence_accuracy: f64,
    pub recurrence_presence_accuracy: f64,
    pub time_preference_presence_accuracy: f64,
}

pub fn summarize_fields(completed: &[&ResultRow]) -> FieldAccuracySummary {
    let hour_errors = completed
        .iter()
        .filter_map(|row| row.start_hour_error)
        .map(f64::from)
        .collect::<Vec<f64>>();

    FieldAccuracySummary {
        title_keyword_overlap_avg: mean(completed.iter().map(|row| row.title_keyword_overlap))
            .unwrap_or(0.0),
        start_time_presence_accuracy: flag_rate(completed, |row| row.start_time_presence_correct),
        start_hour_accuracy: flag_rate(completed, |row| row.start_hour_correct),
        avg_hour_error: mean(hour_errors.into_iter()),
        end_time_presence_accuracy: flag_rate(completed, |row| row.end_time_presence_correct),
        recurrence_presence_accuracy: flag_rate(completed, |row| row.recurrence_presence_correct),
        time_preference_presence_accuracy: flag_rate(completed, |row| {
            row.time_preference_presence_correct
        }),
    }
}
