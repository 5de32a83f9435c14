use std::f64::consts::PI;

/// Sampled sinusoid `amplitude * sin(2 pi f t + phase)`.
pub fn sine_wave(
    length: usize,
    frequency: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
) -> Vec<f64> {
    (0..length)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f64 / sample_rate + phase).sin())
        .collect()
}
