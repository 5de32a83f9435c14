use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps a planned `rustfft` transform for reuse across windows.
///
/// The plan is shared and `amplitude` takes `&self`, so one helper can serve
/// every window of a run, including from several threads.
#[derive(Clone)]
pub struct FftHelper {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of non-negative frequency bins: `size / 2 + 1`.
    pub fn bin_count(&self) -> usize {
        self.size / 2 + 1
    }

    /// Frequencies of the non-negative bins for a given sample rate.
    pub fn frequencies(&self, sample_rate: f64) -> Vec<f64> {
        let resolution = sample_rate / self.size as f64;
        (0..self.bin_count())
            .map(|bin| bin as f64 * resolution)
            .collect()
    }

    /// Magnitude of the forward transform of a real sequence, non-negative
    /// bins only. Input shorter than the plan is zero-padded.
    pub fn amplitude(&self, input: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.size)
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());

        self.fft.process(&mut buffer);
        buffer.truncate(self.bin_count());
        buffer.iter().map(|c| c.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn fft_helper_returns_half_spectrum() {
        let helper = FftHelper::new(8);
        let output = helper.amplitude(&[1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0, 0.0]);
        assert_eq!(output.len(), 5);
        assert!((output[2] - 4.0).abs() < 1e-12);
        assert!(output[0].abs() < 1e-12);
    }

    #[test]
    fn frequencies_follow_resolution() {
        let helper = FftHelper::new(10);
        let freqs = helper.frequencies(100.0);
        assert_eq!(freqs, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn tone_lands_in_its_bin() {
        let helper = FftHelper::new(64);
        let tone: Vec<f64> = (0..64)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / 64.0).sin())
            .collect();
        let amplitude = helper.amplitude(&tone);
        let peak = amplitude
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| bin);
        assert_eq!(peak, Some(5));
    }
}
