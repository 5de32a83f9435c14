use rayon::prelude::*;

use crate::prelude::{FailurePolicy, HvsrConfig, HvsrError, HvsrResult};
use crate::processing::aggregate::{Aggregator, MergedResult};
use crate::processing::curve::HvsrCurve;
use crate::processing::quality::{QualityCheck, QualitySuite};
use crate::processing::ratio::RatioComputer;
use crate::processing::spectrum::SpectralEstimator;
use crate::processing::windower::{RejectReason, RejectedWindow, Windower};
use crate::record::{Component, Record, Window};
use crate::telemetry::log::LogManager;

/// Per-window curves of one record plus the windows that were dropped.
#[derive(Debug, Clone)]
pub struct HvsrAnalysis {
    /// One curve per accepted window, in window order.
    pub curves: Vec<HvsrCurve>,
    /// Window index of each entry in `curves`.
    pub accepted: Vec<usize>,
    pub rejected: Vec<RejectedWindow>,
    pub window_samples: usize,
    pub sample_rate: f64,
}

impl HvsrAnalysis {
    pub fn window_count(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// One source of curves for [`merge_hvsr`].
#[derive(Debug, Clone, Copy)]
pub enum MergeInput<'a> {
    Record(&'a Record),
    Curves(&'a [HvsrCurve]),
}

pub fn compute_hvsr(record: &Record, config: &HvsrConfig) -> HvsrResult<HvsrAnalysis> {
    compute_hvsr_with_check(record, config, None)
}

/// Like [`compute_hvsr`], with an extra caller-supplied window check applied
/// after the configured ones.
pub fn compute_hvsr_with_check(
    record: &Record,
    config: &HvsrConfig,
    check: Option<&dyn QualityCheck>,
) -> HvsrResult<HvsrAnalysis> {
    config.validate()?;
    let logger = LogManager::new("pipeline");

    let windower = Windower::new(record, config.window_duration, config.overlap_fraction)?;
    let mut suite = QualitySuite::from_config(&config.quality);
    if let Some(check) = check {
        suite.push_ref(check);
    }
    let set = windower.split(
        record,
        (!suite.is_empty()).then_some(&suite as &dyn QualityCheck),
    );

    let estimator = SpectralEstimator::new(config, set.window_samples, record.sample_rate());
    let ratio = RatioComputer::from_config(config);

    let outcomes: Vec<HvsrResult<HvsrCurve>> = if config.parallel {
        set.accepted
            .par_iter()
            .map(|window| analyse_window(window, &estimator, &ratio))
            .collect()
    } else {
        set.accepted
            .iter()
            .map(|window| analyse_window(window, &estimator, &ratio))
            .collect()
    };

    let mut curves = Vec::with_capacity(outcomes.len());
    let mut accepted = Vec::with_capacity(outcomes.len());
    let mut rejected = set.rejected;

    for (window, outcome) in set.accepted.iter().zip(outcomes) {
        match outcome {
            Ok(curve) => {
                accepted.push(window.index());
                curves.push(curve);
            }
            Err(err @ HvsrError::EstimationFailed { .. })
                if config.failure_policy == FailurePolicy::SkipWindow =>
            {
                logger.warn(&format!("skipping window {}: {}", window.index(), err));
                rejected.push(RejectedWindow {
                    index: window.index(),
                    start_seconds: window.start_seconds(),
                    reason: RejectReason::EstimationFailed(err.to_string()),
                });
            }
            Err(err) => return Err(err),
        }
    }
    rejected.sort_by_key(|r| r.index);

    logger.record(&format!(
        "record at {}: {} windows of {} samples, {} accepted, {} rejected",
        record.start_time(),
        accepted.len() + rejected.len(),
        set.window_samples,
        accepted.len(),
        rejected.len()
    ));

    Ok(HvsrAnalysis {
        curves,
        accepted,
        rejected,
        window_samples: set.window_samples,
        sample_rate: record.sample_rate(),
    })
}

fn analyse_window(
    window: &Window<'_>,
    estimator: &SpectralEstimator,
    ratio: &RatioComputer,
) -> HvsrResult<HvsrCurve> {
    let ns = estimator.estimate(window, Component::NorthSouth)?;
    let ew = estimator.estimate(window, Component::EastWest)?;
    let ud = estimator.estimate(window, Component::Vertical)?;
    ratio.combine(&ns, &ew, &ud)
}

/// Merge every window of every input into one curve.
///
/// Records are analysed with `config` first; curve inputs are taken as-is.
pub fn merge_hvsr(inputs: &[MergeInput<'_>], config: &HvsrConfig) -> HvsrResult<MergedResult> {
    config.validate()?;

    let mut curves = Vec::new();
    for input in inputs {
        match input {
            MergeInput::Record(record) => curves.extend(compute_hvsr(record, config)?.curves),
            MergeInput::Curves(source) => curves.extend_from_slice(source),
        }
    }

    Aggregator::from_config(config).merge(&curves)
}
