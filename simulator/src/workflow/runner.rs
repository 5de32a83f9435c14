use crate::workflow::config::WorkflowConfig;
use crate::workflow::grouping::group_sessions;
use anyhow::Context;
use chrono::{DateTime, Utc};
use hvsrcore::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use hvsrcore::{compute_hvsr, merge_hvsr, HvsrAnalysis, HvsrError, MergeInput, MergedResult, Record};

/// A record plus the name its reports are written under.
pub struct LabeledRecord {
    pub label: String,
    pub record: Record,
}

pub struct RecordOutcome {
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub analysis: HvsrAnalysis,
    /// Merge of this record's own windows, if any were usable.
    pub merged: Option<MergedResult>,
    pub note: Option<String>,
}

pub struct SessionOutcome {
    pub index: usize,
    pub labels: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub merged: Option<MergedResult>,
    pub note: Option<String>,
}

pub struct WorkflowResult {
    pub records: Vec<RecordOutcome>,
    pub sessions: Vec<SessionOutcome>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    logger: LogManager,
}

/// Merge failures caused by too little usable data are reported per record
/// or session; anything else ends the run.
fn merge_or_note(
    inputs: &[MergeInput<'_>],
    config: &WorkflowConfig,
) -> anyhow::Result<(Option<MergedResult>, Option<String>)> {
    match merge_hvsr(inputs, &config.analysis) {
        Ok(merged) => Ok((Some(merged), None)),
        Err(err @ HvsrError::InsufficientData(_)) => Ok((None, Some(err.to_string()))),
        Err(err) => Err(err.into()),
    }
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("runner"),
        }
    }

    pub fn execute(&self, inputs: &[LabeledRecord]) -> anyhow::Result<WorkflowResult> {
        self.config.validate()?;
        let metrics = MetricsRecorder::new();

        let mut records = Vec::with_capacity(inputs.len());
        for input in inputs {
            let analysis = compute_hvsr(&input.record, &self.config.analysis)
                .with_context(|| format!("analysing record {}", input.label))?;
            metrics.record_analysis(analysis.accepted.len(), analysis.rejected.len());

            let (merged, note) =
                merge_or_note(&[MergeInput::Curves(&analysis.curves)], &self.config)
                    .with_context(|| format!("merging windows of record {}", input.label))?;
            if let Some(note) = &note {
                self.logger
                    .warn(&format!("record {}: {}", input.label, note));
            }

            records.push(RecordOutcome {
                label: input.label.clone(),
                start_time: input.record.start_time(),
                end_time: input.record.end_time(),
                analysis,
                merged,
                note,
            });
        }

        let spans: Vec<_> = records
            .iter()
            .map(|outcome| (outcome.start_time, outcome.end_time))
            .collect();
        let mut sessions = Vec::new();
        for (index, members) in group_sessions(&spans, self.config.max_gap_seconds)
            .into_iter()
            .enumerate()
        {
            let merge_inputs: Vec<MergeInput<'_>> = members
                .iter()
                .map(|&member| MergeInput::Curves(&records[member].analysis.curves))
                .collect();
            let (merged, note) = merge_or_note(&merge_inputs, &self.config)
                .with_context(|| format!("merging session {}", index))?;
            metrics.record_session(merged.is_some());

            match (&merged, &note) {
                (Some(result), _) => self.logger.record(&format!(
                    "session {}: {} records, {} curves, peak {:.3} Hz (H/V {:.3})",
                    index,
                    members.len(),
                    result.curve_count,
                    result.peak_frequency,
                    result.peak_value
                )),
                (None, Some(note)) => self
                    .logger
                    .warn(&format!("session {} skipped: {}", index, note)),
                (None, None) => {}
            }

            sessions.push(SessionOutcome {
                index,
                labels: members
                    .iter()
                    .map(|&member| records[member].label.clone())
                    .collect(),
                start_time: members
                    .iter()
                    .map(|&member| records[member].start_time)
                    .min()
                    .unwrap_or_default(),
                end_time: members
                    .iter()
                    .map(|&member| records[member].end_time)
                    .max()
                    .unwrap_or_default(),
                merged,
                note,
            });
        }

        let snapshot = metrics.snapshot();
        self.logger.record(&format!(
            "{} records, {} windows accepted, {} rejected, {} sessions merged, {} skipped",
            snapshot.records,
            snapshot.windows_accepted,
            snapshot.windows_rejected,
            snapshot.sessions_merged,
            snapshot.sessions_failed
        ));

        Ok(WorkflowResult {
            records,
            sessions,
            metrics: snapshot,
        })
    }
}
