use std::borrow::Cow;

use ndarray::Array2;
use serde::Serialize;

use crate::math::interp::{grids_match, interpolate_log_amplitude, log_space};
use crate::math::stats::StatsHelper;
use crate::prelude::{
    CentralTendency, HvsrConfig, HvsrError, HvsrResult, LogGrid, PeakSearchRange,
};
use crate::processing::curve::HvsrCurve;
use crate::telemetry::log::LogManager;

/// Representative H/V curve of many windows, with asymmetric bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedResult {
    pub frequencies: Vec<f64>,
    pub central: Vec<Option<f64>>,
    pub lower_bound: Vec<Option<f64>>,
    pub upper_bound: Vec<Option<f64>>,
    /// Standard deviation of `ln(value)` per bin.
    pub log_std: Vec<Option<f64>>,
    /// Curves contributing a usable value at each bin.
    pub defined_counts: Vec<usize>,
    pub curve_count: usize,
    pub dispersion_multiplier: f64,
    pub peak_frequency: f64,
    pub peak_value: f64,
}

impl MergedResult {
    /// Lower and upper bounds at `multiplier` log-standard-deviations.
    pub fn band(&self, multiplier: f64) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        self.central
            .iter()
            .zip(&self.log_std)
            .map(|(&central, &std)| match (central, std) {
                (Some(c), Some(s)) => {
                    let factor = (multiplier * s).exp();
                    (Some(c / factor), Some(c * factor))
                }
                _ => (None, None),
            })
            .unzip()
    }
}

/// Merges per-window curves into one [`MergedResult`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    central: CentralTendency,
    dispersion_multiplier: f64,
    peak_range: PeakSearchRange,
    reference_grid: Option<LogGrid>,
    logger: LogManager,
}

impl Aggregator {
    pub fn new(
        central: CentralTendency,
        dispersion_multiplier: f64,
        peak_range: PeakSearchRange,
        reference_grid: Option<LogGrid>,
    ) -> Self {
        Self {
            central,
            dispersion_multiplier,
            peak_range,
            reference_grid,
            logger: LogManager::new("aggregator"),
        }
    }

    pub fn from_config(config: &HvsrConfig) -> Self {
        Self::new(
            config.central_tendency,
            config.dispersion_multiplier,
            config.peak_search_range,
            config.reference_grid,
        )
    }

    /// Bring every curve onto one grid.
    ///
    /// Curves already sharing a grid are borrowed untouched. Otherwise each is
    /// resampled onto the configured reference grid, or onto a log-spaced grid
    /// between the lowest positive and the highest frequency observed with as
    /// many points as the longest curve.
    pub fn reconcile<'c>(&self, curves: &'c [HvsrCurve]) -> HvsrResult<Cow<'c, [HvsrCurve]>> {
        let first = curves.first().ok_or_else(|| {
            HvsrError::InsufficientData("no curves to reconcile".into())
        })?;

        let grid = match self.reference_grid {
            Some(reference) => log_space(reference.min_hz, reference.max_hz, reference.points),
            None => {
                if curves
                    .iter()
                    .all(|curve| grids_match(first.frequencies(), curve.frequencies()))
                {
                    return Ok(Cow::Borrowed(curves));
                }
                common_grid(curves)?
            }
        };

        self.logger.detail(&format!(
            "resampling {} curves onto {} bins",
            curves.len(),
            grid.len()
        ));
        Ok(Cow::Owned(
            curves
                .iter()
                .map(|curve| resample(curve, &grid))
                .collect(),
        ))
    }

    pub fn merge(&self, curves: &[HvsrCurve]) -> HvsrResult<MergedResult> {
        if curves.is_empty() {
            return Err(HvsrError::InsufficientData(
                "no HVSR curves to merge".into(),
            ));
        }

        let curves = self.reconcile(curves)?;
        let frequencies = curves[0].frequencies().to_vec();
        let bins = frequencies.len();
        let matrix = Array2::from_shape_fn((curves.len(), bins), |(row, bin)| {
            curves[row].values()[bin]
        });

        let mut central = Vec::with_capacity(bins);
        let mut log_std = Vec::with_capacity(bins);
        let mut defined_counts = Vec::with_capacity(bins);

        for column in matrix.columns() {
            let defined: Vec<f64> = column.iter().flatten().copied().collect();
            defined_counts.push(defined.len());

            let Some(&first) = defined.first() else {
                central.push(None);
                log_std.push(None);
                continue;
            };
            if defined.iter().all(|&v| v == first) {
                central.push(Some(first));
                log_std.push(Some(0.0));
                continue;
            }

            // Zero ratios have no logarithm; they pull the geometric mean to
            // zero and only the positive values shape the spread.
            let logs: Vec<f64> = defined
                .iter()
                .filter(|&&v| v > 0.0)
                .map(|v| v.ln())
                .collect();
            let has_zero = logs.len() < defined.len();
            let stats = StatsHelper::log_stats(&logs);

            let centre = match self.central {
                CentralTendency::GeometricMean if has_zero => 0.0,
                CentralTendency::GeometricMean => stats.map_or(0.0, |s| s.mean.exp()),
                CentralTendency::Median => StatsHelper::median(&defined).unwrap_or(first),
            };
            central.push(Some(centre));
            log_std.push(Some(stats.map_or(0.0, |s| s.std)));
        }

        let (frequency, value) = find_peak(&frequencies, &central, &self.peak_range)
            .ok_or_else(|| {
                HvsrError::InsufficientData(
                    "no defined bins inside the peak search range".into(),
                )
            })?;

        let mut merged = MergedResult {
            frequencies,
            central,
            lower_bound: Vec::new(),
            upper_bound: Vec::new(),
            log_std,
            defined_counts,
            curve_count: curves.len(),
            dispersion_multiplier: self.dispersion_multiplier,
            peak_frequency: frequency,
            peak_value: value,
        };
        let (lower, upper) = merged.band(self.dispersion_multiplier);
        merged.lower_bound = lower;
        merged.upper_bound = upper;

        self.logger.record(&format!(
            "merged {} curves, peak {:.3} at {:.3} Hz",
            merged.curve_count, merged.peak_value, merged.peak_frequency
        ));
        Ok(merged)
    }
}

/// Frequency and value of the largest defined bin inside `range`; ties go to
/// the lowest frequency.
pub fn find_peak(
    frequencies: &[f64],
    central: &[Option<f64>],
    range: &PeakSearchRange,
) -> Option<(f64, f64)> {
    let len = frequencies.len();
    let mut best: Option<(f64, f64)> = None;
    for (index, (&frequency, value)) in frequencies.iter().zip(central).enumerate() {
        let Some(value) = *value else { continue };
        if !range.contains(index, len, frequency) {
            continue;
        }
        if best.map_or(true, |(_, current)| value > current) {
            best = Some((frequency, value));
        }
    }
    best
}

fn common_grid(curves: &[HvsrCurve]) -> HvsrResult<Vec<f64>> {
    let min = curves
        .iter()
        .filter_map(|curve| curve.frequencies().iter().copied().find(|&f| f > 0.0))
        .fold(f64::INFINITY, f64::min);
    let max = curves
        .iter()
        .filter_map(|curve| curve.frequencies().last().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() {
        return Err(HvsrError::InsufficientData(
            "curves have no positive frequencies to build a common grid".into(),
        ));
    }
    if max <= min {
        return Ok(vec![min]);
    }
    let points = curves.iter().map(HvsrCurve::len).max().unwrap_or(2).max(2);
    Ok(log_space(min, max, points))
}

fn resample(curve: &HvsrCurve, grid: &[f64]) -> HvsrCurve {
    let values = interpolate_log_amplitude(curve.frequencies(), curve.values(), grid);
    HvsrCurve::from_parts(grid.to_vec(), values)
}
