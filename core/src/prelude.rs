use serde::{Deserialize, Serialize};

use crate::record::Component;

/// Shared configuration for every stage of the HVSR pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HvsrConfig {
    /// Analysis window length in seconds.
    pub window_duration: f64,
    /// Fraction of each window shared with the next one, in `[0, 1)`.
    pub overlap_fraction: f64,
    pub detrend: Detrend,
    pub taper: TaperType,
    pub smoothing: SmoothingKind,
    /// Konno-Ohmachi bandwidth coefficient `b`; larger values smooth less.
    pub smoothing_bandwidth: f64,
    pub horizontal_combination_rule: HorizontalCombination,
    /// Vertical amplitudes at or below this value leave the ratio undefined.
    pub epsilon: f64,
    pub peak_search_range: PeakSearchRange,
    /// Number of log-standard-deviations spanned by the reported bounds.
    pub dispersion_multiplier: f64,
    pub central_tendency: CentralTendency,
    /// Fixed grid every curve is resampled onto before merging.
    pub reference_grid: Option<LogGrid>,
    pub quality: QualityConfig,
    pub failure_policy: FailurePolicy,
    /// Estimate windows on the rayon pool instead of sequentially.
    pub parallel: bool,
}

impl Default for HvsrConfig {
    fn default() -> Self {
        Self {
            window_duration: 40.96,
            overlap_fraction: 0.0,
            detrend: Detrend::Linear,
            taper: TaperType::Tukey { alpha: 0.2 },
            smoothing: SmoothingKind::KonnoOhmachi,
            smoothing_bandwidth: 40.0,
            horizontal_combination_rule: HorizontalCombination::Rms,
            epsilon: 1e-12,
            peak_search_range: PeakSearchRange::default(),
            dispersion_multiplier: 1.0,
            central_tendency: CentralTendency::GeometricMean,
            reference_grid: None,
            quality: QualityConfig::default(),
            failure_policy: FailurePolicy::Abort,
            parallel: false,
        }
    }
}

impl HvsrConfig {
    /// Checks every option that the pipeline relies on being in range.
    pub fn validate(&self) -> HvsrResult<()> {
        if !(self.window_duration.is_finite() && self.window_duration > 0.0) {
            return Err(HvsrError::InvalidConfig(format!(
                "window_duration must be positive, got {}",
                self.window_duration
            )));
        }
        if !(0.0..1.0).contains(&self.overlap_fraction) {
            return Err(HvsrError::InvalidConfig(format!(
                "overlap_fraction must lie in [0, 1), got {}",
                self.overlap_fraction
            )));
        }
        if let TaperType::Tukey { alpha } = self.taper {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(HvsrError::InvalidConfig(format!(
                    "tukey alpha must lie in [0, 1], got {}",
                    alpha
                )));
            }
        }
        if self.smoothing == SmoothingKind::KonnoOhmachi
            && !(self.smoothing_bandwidth.is_finite() && self.smoothing_bandwidth > 0.0)
        {
            return Err(HvsrError::InvalidConfig(format!(
                "smoothing_bandwidth must be positive, got {}",
                self.smoothing_bandwidth
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(HvsrError::InvalidConfig(format!(
                "epsilon must be a small positive value, got {}",
                self.epsilon
            )));
        }
        if !(self.dispersion_multiplier.is_finite() && self.dispersion_multiplier >= 0.0) {
            return Err(HvsrError::InvalidConfig(format!(
                "dispersion_multiplier must be non-negative, got {}",
                self.dispersion_multiplier
            )));
        }
        self.peak_search_range.validate()?;
        if let Some(grid) = &self.reference_grid {
            grid.validate()?;
        }
        self.quality.validate()
    }
}

/// Trend removal applied to each channel before tapering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detrend {
    None,
    Mean,
    Linear,
}

/// Taper applied to the detrended window to limit leakage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaperType {
    Rectangular,
    Hann,
    /// Cosine taper over `alpha / 2` of the window at each end.
    Tukey { alpha: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKind {
    None,
    KonnoOhmachi,
}

/// Rule merging the two horizontal amplitudes at one frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalCombination {
    /// `sqrt((ns^2 + ew^2) / 2)`
    Rms,
    ArithmeticMean,
    GeometricMean,
    Max,
}

impl HorizontalCombination {
    pub fn combine(self, ns: f64, ew: f64) -> f64 {
        match self {
            Self::Rms => ((ns * ns + ew * ew) / 2.0).sqrt(),
            Self::ArithmeticMean => (ns + ew) / 2.0,
            Self::GeometricMean => (ns * ew).sqrt(),
            Self::Max => ns.max(ew),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralTendency {
    GeometricMean,
    Median,
}

/// Frequency band searched for the resonance peak.
///
/// `edge_bins` drops that many bins at each end of the merged grid, which for
/// an FFT grid removes the 0 Hz and Nyquist bins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakSearchRange {
    pub min_hz: Option<f64>,
    pub max_hz: Option<f64>,
    pub edge_bins: usize,
}

impl Default for PeakSearchRange {
    fn default() -> Self {
        Self {
            min_hz: None,
            max_hz: None,
            edge_bins: 1,
        }
    }
}

impl PeakSearchRange {
    pub fn unbounded() -> Self {
        Self {
            min_hz: None,
            max_hz: None,
            edge_bins: 0,
        }
    }

    pub fn validate(&self) -> HvsrResult<()> {
        if let (Some(lo), Some(hi)) = (self.min_hz, self.max_hz) {
            if lo > hi {
                return Err(HvsrError::InvalidConfig(format!(
                    "peak search range is empty: {} Hz > {} Hz",
                    lo, hi
                )));
            }
        }
        Ok(())
    }

    /// Whether bin `index` of a grid of `len` bins at `frequency` is searched.
    pub fn contains(&self, index: usize, len: usize, frequency: f64) -> bool {
        if index < self.edge_bins || index + self.edge_bins >= len {
            return false;
        }
        if self.min_hz.is_some_and(|lo| frequency < lo) {
            return false;
        }
        !self.max_hz.is_some_and(|hi| frequency > hi)
    }
}

/// Log-spaced frequency grid description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogGrid {
    pub min_hz: f64,
    pub max_hz: f64,
    pub points: usize,
}

impl LogGrid {
    pub fn validate(&self) -> HvsrResult<()> {
        if !(self.min_hz > 0.0 && self.max_hz > self.min_hz && self.points >= 2) {
            return Err(HvsrError::InvalidConfig(format!(
                "reference grid needs 0 < min_hz < max_hz and >= 2 points, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Window rejection criteria applied before spectral estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Reject windows whose absolute amplitude exceeds this on any channel.
    pub max_amplitude: Option<f64>,
    pub sta_lta: Option<StaLtaConfig>,
}

impl QualityConfig {
    pub fn validate(&self) -> HvsrResult<()> {
        if let Some(limit) = self.max_amplitude {
            if !(limit > 0.0) {
                return Err(HvsrError::InvalidConfig(format!(
                    "max_amplitude must be positive, got {}",
                    limit
                )));
            }
        }
        if let Some(sta_lta) = &self.sta_lta {
            if !(sta_lta.sta_seconds > 0.0 && sta_lta.min_ratio <= sta_lta.max_ratio) {
                return Err(HvsrError::InvalidConfig(format!(
                    "invalid STA/LTA limits {:?}",
                    sta_lta
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaLtaConfig {
    pub sta_seconds: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

/// What happens when estimation fails for a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Abort,
    SkipWindow,
}

/// Common error type for the HVSR pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HvsrError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("frequency grid mismatch: {0}")]
    GridMismatch(String),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("estimation failed for window {window} ({component}): {reason}")]
    EstimationFailed {
        window: usize,
        component: Component,
        reason: String,
    },
}

pub type HvsrResult<T> = Result<T, HvsrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(HvsrConfig::default().validate().is_ok());
    }

    #[test]
    fn overlap_of_one_is_rejected() {
        let config = HvsrConfig {
            overlap_fraction: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HvsrError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_epsilon_is_rejected() {
        let config = HvsrConfig {
            epsilon: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn combination_rules_match_their_formulas() {
        assert!((HorizontalCombination::Rms.combine(3.0, 4.0) - 12.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(HorizontalCombination::ArithmeticMean.combine(3.0, 5.0), 4.0);
        assert_eq!(HorizontalCombination::GeometricMean.combine(2.0, 8.0), 4.0);
        assert_eq!(HorizontalCombination::Max.combine(2.0, 8.0), 8.0);
    }

    #[test]
    fn default_peak_range_skips_edge_bins() {
        let range = PeakSearchRange::default();
        assert!(!range.contains(0, 4, 0.0));
        assert!(range.contains(1, 4, 1.0));
        assert!(!range.contains(3, 4, 3.0));
    }

    #[test]
    fn config_reads_partial_json_with_defaults() {
        let config: HvsrConfig = serde_json::from_str(
            r#"{"window_duration": 20.0, "horizontal_combination_rule": "geometric_mean",
                "taper": {"kind": "tukey", "alpha": 0.1}}"#,
        )
        .unwrap();
        assert_eq!(config.window_duration, 20.0);
        assert_eq!(
            config.horizontal_combination_rule,
            HorizontalCombination::GeometricMean
        );
        assert_eq!(config.taper, TaperType::Tukey { alpha: 0.1 });
        assert_eq!(config.smoothing_bandwidth, 40.0);
    }
}
