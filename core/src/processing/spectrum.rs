use serde::Serialize;

use crate::math::fft::FftHelper;
use crate::math::interp::is_strictly_increasing;
use crate::math::smoothing::konno_ohmachi;
use crate::math::taper::{apply_taper, detrend, generate_taper};
use crate::prelude::{Detrend, HvsrConfig, HvsrError, HvsrResult, SmoothingKind};
use crate::record::{Component, Window};
use crate::telemetry::log::LogManager;

/// Smoothed amplitude spectrum of one channel of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl Spectrum {
    pub fn new(frequencies: Vec<f64>, amplitudes: Vec<f64>) -> HvsrResult<Self> {
        if frequencies.len() != amplitudes.len() {
            return Err(HvsrError::InvalidInput(format!(
                "spectrum has {} frequencies but {} amplitudes",
                frequencies.len(),
                amplitudes.len()
            )));
        }
        if !is_strictly_increasing(&frequencies) {
            return Err(HvsrError::InvalidInput(
                "spectrum frequencies must be finite and strictly increasing".into(),
            ));
        }
        if amplitudes.iter().any(|a| !(a.is_finite() && *a >= 0.0)) {
            return Err(HvsrError::InvalidInput(
                "spectrum amplitudes must be finite and non-negative".into(),
            ));
        }
        Ok(Self {
            frequencies,
            amplitudes,
        })
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Detrend, taper, transform and smooth one channel of a window.
///
/// Built once per run for a fixed window length and sample rate; the taper
/// and FFT plan are shared by every window, so `estimate` takes `&self`.
#[derive(Clone)]
pub struct SpectralEstimator {
    detrend: Detrend,
    taper: Vec<f64>,
    smoothing: SmoothingKind,
    bandwidth: f64,
    fft: FftHelper,
    frequencies: Vec<f64>,
    logger: LogManager,
}

impl SpectralEstimator {
    pub fn new(config: &HvsrConfig, window_samples: usize, sample_rate: f64) -> Self {
        let fft = FftHelper::new(window_samples);
        let frequencies = fft.frequencies(sample_rate);
        Self {
            detrend: config.detrend,
            taper: generate_taper(config.taper, window_samples),
            smoothing: config.smoothing,
            bandwidth: config.smoothing_bandwidth,
            fft,
            frequencies,
            logger: LogManager::new("estimator"),
        }
    }

    /// Grid every spectrum from this estimator is reported on.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn estimate(&self, window: &Window<'_>, component: Component) -> HvsrResult<Spectrum> {
        self.estimate_samples(window.samples(component))
            .map_err(|reason| HvsrError::EstimationFailed {
                window: window.index(),
                component,
                reason,
            })
    }

    /// Spectrum of a raw sample slice of the configured window length.
    pub fn estimate_samples(&self, samples: &[f64]) -> Result<Spectrum, String> {
        if samples.len() != self.fft.size() {
            return Err(format!(
                "expected {} samples, got {}",
                self.fft.size(),
                samples.len()
            ));
        }
        if let Some(position) = samples.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite sample at offset {}", position));
        }

        let bins = self.fft.bin_count();
        let constant = samples.windows(2).all(|pair| pair[0] == pair[1]);
        if constant {
            self.logger.detail("constant window, spectrum is zero");
            return Ok(Spectrum {
                frequencies: self.frequencies.clone(),
                amplitudes: vec![0.0; bins],
            });
        }

        let mut buffer = samples.to_vec();
        detrend(&mut buffer, self.detrend);
        apply_taper(&mut buffer, &self.taper);
        let raw = self.fft.amplitude(&buffer);

        let amplitudes = match self.smoothing {
            SmoothingKind::KonnoOhmachi => konno_ohmachi(&self.frequencies, &raw, self.bandwidth),
            SmoothingKind::None => raw,
        };

        Ok(Spectrum {
            frequencies: self.frequencies.clone(),
            amplitudes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::PI;

    fn estimator(n: usize, sample_rate: f64) -> SpectralEstimator {
        SpectralEstimator::new(&HvsrConfig::default(), n, sample_rate)
    }

    #[test]
    fn grid_has_half_length_plus_one_bins() {
        let est = estimator(2000, 100.0);
        let tone: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / 100.0).sin())
            .collect();
        let spectrum = est.estimate_samples(&tone).unwrap();
        assert_eq!(spectrum.len(), 1001);
        assert_eq!(spectrum.frequencies()[0], 0.0);
        assert!((spectrum.frequencies()[1000] - 50.0).abs() < 1e-9);
        assert!((spectrum.frequencies()[1] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn tone_peak_survives_smoothing() {
        let est = estimator(2000, 100.0);
        let tone: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / 100.0).sin())
            .collect();
        let spectrum = est.estimate_samples(&tone).unwrap();
        let peak = spectrum
            .amplitudes()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| spectrum.frequencies()[bin])
            .unwrap();
        assert!((peak - 5.0).abs() <= 0.1, "peak at {}", peak);
    }

    #[test]
    fn constant_window_yields_zero_spectrum() {
        let est = estimator(64, 10.0);
        let spectrum = est.estimate_samples(&[3.7; 64]).unwrap();
        assert_eq!(spectrum.len(), 33);
        assert!(spectrum.amplitudes().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn non_finite_samples_fail_with_window_context() {
        let mut ud = vec![0.5; 64];
        ud[10] = f64::NAN;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = Record::new(10.0, start, vec![0.0; 64], vec![0.0; 64], ud).unwrap();
        let window = Window::new(&record, 0, 0, 64);

        let err = estimator(64, 10.0)
            .estimate(&window, Component::Vertical)
            .unwrap_err();
        assert!(matches!(
            err,
            HvsrError::EstimationFailed {
                window: 0,
                component: Component::Vertical,
                ..
            }
        ));
    }

    #[test]
    fn spectrum_constructor_checks_invariants() {
        assert!(Spectrum::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(Spectrum::new(vec![1.0, 1.0], vec![1.0, 1.0]).is_err());
        assert!(Spectrum::new(vec![0.0, 1.0], vec![1.0, -1.0]).is_err());
        assert!(Spectrum::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_ok());
    }
}
