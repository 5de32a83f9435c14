use anyhow::Context;
use hvsrcore::HvsrConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub analysis: HvsrConfig,
    /// Largest gap, in seconds, between one record's end and the next
    /// record's start that still counts as the same session.
    pub max_gap_seconds: f64,
    /// Text records to analyse; when empty the generator is used instead.
    pub inputs: Vec<PathBuf>,
    /// Sample rate assumed for inputs without a `sample_rate` header.
    pub sample_rate: Option<f64>,
    pub generator: GeneratorConfig,
    pub output_dir: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            analysis: HvsrConfig::default(),
            max_gap_seconds: 1.0,
            inputs: Vec::new(),
            sample_rate: None,
            generator: GeneratorConfig::default(),
            output_dir: PathBuf::from("hvsr_output"),
        }
    }
}

/// Command-line values that take precedence over the workflow file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub inputs: Vec<PathBuf>,
    pub sample_rate: Option<f64>,
    pub window_duration: Option<f64>,
    pub overlap: Option<f64>,
    pub output_dir: Option<PathBuf>,
    pub parallel: bool,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if !overrides.inputs.is_empty() {
            self.inputs = overrides.inputs;
        }
        if overrides.sample_rate.is_some() {
            self.sample_rate = overrides.sample_rate;
        }
        if let Some(duration) = overrides.window_duration {
            self.analysis.window_duration = duration;
        }
        if let Some(overlap) = overrides.overlap {
            self.analysis.overlap_fraction = overlap;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        self.analysis.parallel |= overrides.parallel;
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.analysis
            .validate()
            .context("checking analysis settings")?;
        anyhow::ensure!(
            self.max_gap_seconds.is_finite() && self.max_gap_seconds >= 0.0,
            "max_gap_seconds must be a non-negative number, got {}",
            self.max_gap_seconds
        );
        Ok(())
    }
}
