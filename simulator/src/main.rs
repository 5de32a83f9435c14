use anyhow::Context;
use clap::Parser;
use generator::profile::build_records;
use ingest::ascii::read_ascii_record;
use log::info;
use report::csv::{write_record_curves, write_session_curve, write_summary};
use report::model::RunReport;
use std::path::PathBuf;
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::{LabeledRecord, Runner};

mod generator;
mod ingest;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline HVSR workflow driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Three-column text record to analyse; repeat for several files
    #[arg(long = "input")]
    inputs: Vec<PathBuf>,
    /// Analyse generated records even when inputs are given
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Sample rate for inputs without a sample_rate header
    #[arg(long)]
    sample_rate: Option<f64>,
    /// Window length in seconds
    #[arg(long)]
    window_duration: Option<f64>,
    /// Fraction of each window shared with the next
    #[arg(long)]
    overlap: Option<f64>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Estimate windows on all cores
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn file_label(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    workflow_config.apply(Overrides {
        inputs: args.inputs,
        sample_rate: args.sample_rate,
        window_duration: args.window_duration,
        overlap: args.overlap,
        output_dir: args.output_dir,
        parallel: args.parallel,
    });

    let mut inputs = Vec::new();
    for path in &workflow_config.inputs {
        let record = read_ascii_record(path, workflow_config.sample_rate)?;
        inputs.push(LabeledRecord {
            label: file_label(path),
            record,
        });
    }
    if args.synthetic || inputs.is_empty() {
        let generated =
            build_records(&workflow_config.generator).context("generating synthetic records")?;
        for (index, record) in generated.into_iter().enumerate() {
            inputs.push(LabeledRecord {
                label: format!("synthetic_{}", index),
                record,
            });
        }
    }

    info!(
        "analysing {} records, window {} s, overlap {}",
        inputs.len(),
        workflow_config.analysis.window_duration,
        workflow_config.analysis.overlap_fraction
    );

    let output_dir = workflow_config.output_dir.clone();
    let runner = Runner::new(workflow_config);
    let result = runner.execute(&inputs)?;

    for outcome in &result.records {
        write_record_curves(&output_dir, outcome)?;
    }
    for session in &result.sessions {
        match &session.merged {
            Some(merged) => {
                write_session_curve(&output_dir, session.index, merged)?;
                println!(
                    "session {} ({} records, {} -> {}): f0 = {:.3} Hz, H/V = {:.3}",
                    session.index,
                    session.labels.len(),
                    session.start_time.format("%Y-%m-%d %H:%M:%S"),
                    session.end_time.format("%Y-%m-%d %H:%M:%S"),
                    merged.peak_frequency,
                    merged.peak_value
                );
            }
            None => println!(
                "session {} skipped: {}",
                session.index,
                session.note.as_deref().unwrap_or("no usable windows")
            ),
        }
    }
    let summary = write_summary(&output_dir, &RunReport::from(&result))?;
    println!(
        "{} records, {} windows accepted, {} rejected -> {}",
        result.metrics.records,
        result.metrics.windows_accepted,
        result.metrics.windows_rejected,
        summary.display()
    );

    Ok(())
}
