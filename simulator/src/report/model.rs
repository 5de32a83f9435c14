use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::runner::{RecordOutcome, SessionOutcome, WorkflowResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedWindowReport {
    pub index: usize,
    pub start_seconds: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordReport {
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sample_rate: f64,
    pub window_samples: usize,
    pub windows_accepted: usize,
    pub rejected: Vec<RejectedWindowReport>,
    pub peak_frequency: Option<f64>,
    pub peak_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub index: usize,
    pub records: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub curve_count: usize,
    pub peak_frequency: Option<f64>,
    pub peak_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotalsReport {
    pub records: usize,
    pub windows_accepted: usize,
    pub windows_rejected: usize,
    pub sessions_merged: usize,
    pub sessions_skipped: usize,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub records: Vec<RecordReport>,
    pub sessions: Vec<SessionReport>,
    pub totals: TotalsReport,
}

impl From<&RecordOutcome> for RecordReport {
    fn from(outcome: &RecordOutcome) -> Self {
        Self {
            label: outcome.label.clone(),
            start_time: outcome.start_time,
            end_time: outcome.end_time,
            sample_rate: outcome.analysis.sample_rate,
            window_samples: outcome.analysis.window_samples,
            windows_accepted: outcome.analysis.accepted.len(),
            rejected: outcome
                .analysis
                .rejected
                .iter()
                .map(|window| RejectedWindowReport {
                    index: window.index,
                    start_seconds: window.start_seconds,
                    reason: window.reason.to_string(),
                })
                .collect(),
            peak_frequency: outcome.merged.as_ref().map(|m| m.peak_frequency),
            peak_value: outcome.merged.as_ref().map(|m| m.peak_value),
            note: outcome.note.clone(),
        }
    }
}

impl From<&SessionOutcome> for SessionReport {
    fn from(outcome: &SessionOutcome) -> Self {
        Self {
            index: outcome.index,
            records: outcome.labels.clone(),
            start_time: outcome.start_time,
            end_time: outcome.end_time,
            curve_count: outcome.merged.as_ref().map_or(0, |m| m.curve_count),
            peak_frequency: outcome.merged.as_ref().map(|m| m.peak_frequency),
            peak_value: outcome.merged.as_ref().map(|m| m.peak_value),
            note: outcome.note.clone(),
        }
    }
}

impl From<&WorkflowResult> for RunReport {
    fn from(result: &WorkflowResult) -> Self {
        Self {
            records: result.records.iter().map(RecordReport::from).collect(),
            sessions: result.sessions.iter().map(SessionReport::from).collect(),
            totals: TotalsReport {
                records: result.metrics.records,
                windows_accepted: result.metrics.windows_accepted,
                windows_rejected: result.metrics.windows_rejected,
                sessions_merged: result.metrics.sessions_merged,
                sessions_skipped: result.metrics.sessions_failed,
            },
        }
    }
}
