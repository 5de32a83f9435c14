use anyhow::Context;
use hvsrcore::MergedResult;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::report::model::RunReport;
use crate::workflow::runner::RecordOutcome;

/// Undefined bins are written as `nan`.
fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.8e}", v),
        None => "nan".to_string(),
    }
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("creating report {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes `<label>_hvsr.csv`: the frequency column followed by one column
/// per accepted window. Returns `None` when the record had no usable window.
pub fn write_record_curves(dir: &Path, outcome: &RecordOutcome) -> anyhow::Result<Option<PathBuf>> {
    let curves = &outcome.analysis.curves;
    let Some(first) = curves.first() else {
        return Ok(None);
    };

    let path = dir.join(format!("{}_hvsr.csv", outcome.label));
    let mut out = create(&path)?;

    let mut header = String::from("freq");
    for index in &outcome.analysis.accepted {
        header.push_str(&format!(",win_{}", index));
    }
    writeln!(out, "{}", header)?;

    for (bin, freq) in first.frequencies().iter().enumerate() {
        let mut row = format!("{:.8e}", freq);
        for curve in curves {
            row.push(',');
            row.push_str(&format_value(curve.values()[bin]));
        }
        writeln!(out, "{}", row)?;
    }
    out.flush()
        .with_context(|| format!("writing report {}", path.display()))?;
    Ok(Some(path))
}

/// Writes `session_<index>.csv` with the merged curve and its bounds.
pub fn write_session_curve(
    dir: &Path,
    index: usize,
    merged: &MergedResult,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("session_{}.csv", index));
    let mut out = create(&path)?;
    writeln!(out, "freq,central,lower,upper")?;
    for (bin, freq) in merged.frequencies.iter().enumerate() {
        writeln!(
            out,
            "{:.8e},{},{},{}",
            freq,
            format_value(merged.central[bin]),
            format_value(merged.lower_bound[bin]),
            format_value(merged.upper_bound[bin])
        )?;
    }
    out.flush()
        .with_context(|| format!("writing report {}", path.display()))?;
    Ok(path)
}

pub fn write_summary(dir: &Path, report: &RunReport) -> anyhow::Result<PathBuf> {
    let path = dir.join("summary.json");
    let mut out = create(&path)?;
    serde_json::to_writer_pretty(&mut out, report).context("serializing run summary")?;
    writeln!(out)?;
    out.flush()
        .with_context(|| format!("writing report {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_records, GeneratorConfig};
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::{LabeledRecord, Runner};

    fn run_once() -> crate::workflow::runner::WorkflowResult {
        let mut cfg = WorkflowConfig::default();
        cfg.analysis.window_duration = 20.0;
        cfg.generator = GeneratorConfig {
            duration_seconds: 60.0,
            ..Default::default()
        };
        let inputs: Vec<LabeledRecord> = build_records(&cfg.generator)
            .unwrap()
            .into_iter()
            .map(|record| LabeledRecord {
                label: "site".to_string(),
                record,
            })
            .collect();
        Runner::new(cfg).execute(&inputs).unwrap()
    }

    #[test]
    fn undefined_values_are_written_as_nan() {
        assert_eq!(format_value(None), "nan");
        assert_eq!(format_value(Some(2.5)), "2.50000000e0");
    }

    #[test]
    fn reports_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_once();

        let record_path = write_record_curves(dir.path(), &result.records[0])
            .unwrap()
            .unwrap();
        let text = fs::read_to_string(&record_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "freq,win_0,win_1,win_2");
        assert_eq!(text.lines().count(), 1 + 1001);
        assert!(lines.next().unwrap().starts_with("0.00000000e0,"));

        let merged = result.sessions[0].merged.as_ref().unwrap();
        let session_path = write_session_curve(dir.path(), 0, merged).unwrap();
        let session = fs::read_to_string(&session_path).unwrap();
        assert!(session.starts_with("freq,central,lower,upper\n"));
        assert_eq!(session.lines().count(), 1 + merged.frequencies.len());

        let summary_path = write_summary(dir.path(), &RunReport::from(&result)).unwrap();
        let parsed: RunReport =
            serde_json::from_str(&fs::read_to_string(summary_path).unwrap()).unwrap();
        assert_eq!(parsed.sessions.len(), 1);
        assert_eq!(parsed.totals.windows_accepted, 3);
        assert_eq!(parsed.records[0].label, "site");
    }
}
