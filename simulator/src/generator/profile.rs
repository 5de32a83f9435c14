use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use hvsrcore::Record;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use super::template::sine_wave;

/// Configuration for generating synthetic microtremor records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_rate: f64,
    pub duration_seconds: f64,
    /// Frequency of the horizontal resonance, in Hz.
    pub resonance_hz: f64,
    pub amplitude: f64,
    /// Half-width of the uniform noise added to every channel.
    pub noise: f64,
    pub seed: u64,
    /// Number of consecutive records to produce.
    pub records: usize,
    pub start_time: Option<DateTime<Utc>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            duration_seconds: 300.0,
            resonance_hz: 5.0,
            amplitude: 1.0,
            noise: 0.01,
            seed: 0,
            records: 1,
            start_time: None,
        }
    }
}

impl GeneratorConfig {
    fn sample_count(&self) -> anyhow::Result<usize> {
        let count = (self.sample_rate * self.duration_seconds).round();
        anyhow::ensure!(
            count.is_finite() && count >= 1.0,
            "generator needs a positive sample count, got {} Hz x {} s",
            self.sample_rate,
            self.duration_seconds
        );
        Ok(count as usize)
    }
}

fn noise_vector(rng: &mut StdRng, length: usize, noise: f64) -> Vec<f64> {
    if noise <= 0.0 {
        return vec![0.0; length];
    }
    (0..length).map(|_| rng.gen_range(-noise..noise)).collect()
}

/// Record `index` of the sequence described by `config`; records follow one
/// another without gaps.
pub fn build_record(config: &GeneratorConfig, index: usize) -> anyhow::Result<Record> {
    let length = config.sample_count()?;
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));

    let add = |mut signal: Vec<f64>, noise: Vec<f64>| {
        for (value, jitter) in signal.iter_mut().zip(noise) {
            *value += jitter;
        }
        signal
    };

    let ns = add(
        sine_wave(length, config.resonance_hz, config.sample_rate, config.amplitude, 0.0),
        noise_vector(&mut rng, length, config.noise),
    );
    let ew = add(
        sine_wave(
            length,
            config.resonance_hz,
            config.sample_rate,
            config.amplitude,
            FRAC_PI_2,
        ),
        noise_vector(&mut rng, length, config.noise),
    );
    let ud = noise_vector(&mut rng, length, config.noise);

    let offset_ms = (index as f64 * length as f64 / config.sample_rate * 1000.0).round() as i64;
    let start = config.start_time.unwrap_or_default() + Duration::milliseconds(offset_ms);

    Record::new(config.sample_rate, start, ns, ew, ud)
        .with_context(|| format!("building synthetic record {}", index))
}

pub fn build_records(config: &GeneratorConfig) -> anyhow::Result<Vec<Record>> {
    (0..config.records.max(1))
        .map(|index| build_record(config, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvsrcore::Component;

    #[test]
    fn generator_builds_expected_sample_count() {
        let config = GeneratorConfig {
            duration_seconds: 60.0,
            ..Default::default()
        };
        let record = build_record(&config, 0).unwrap();
        assert_eq!(record.len(), 6000);
        assert_eq!(record.sample_rate(), 100.0);
    }

    #[test]
    fn generator_records_are_consecutive() {
        let config = GeneratorConfig {
            duration_seconds: 30.0,
            records: 3,
            seed: 13,
            ..Default::default()
        };
        let records = build_records(&config).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].start_time(), records[0].end_time());
        assert_eq!(records[2].start_time(), records[1].end_time());
        assert_ne!(
            records[0].channel(Component::Vertical),
            records[1].channel(Component::Vertical)
        );
    }

    #[test]
    fn generator_rejects_empty_duration() {
        let config = GeneratorConfig {
            duration_seconds: 0.0,
            ..Default::default()
        };
        assert!(build_record(&config, 0).is_err());
    }
}
