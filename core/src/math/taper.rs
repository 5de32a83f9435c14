//! Trend removal and taper functions applied before the transform.

use std::f64::consts::PI;

use crate::prelude::{Detrend, TaperType};

/// Remove the mean or the least-squares line from `samples` in place.
pub fn detrend(samples: &mut [f64], mode: Detrend) {
    let n = samples.len();
    if n == 0 || mode == Detrend::None {
        return;
    }

    let mean = samples.iter().sum::<f64>() / n as f64;
    let slope = match mode {
        Detrend::Linear if n > 1 => {
            // Centred abscissa keeps the intercept equal to the mean.
            let centre = (n as f64 - 1.0) / 2.0;
            let (num, den) = samples
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(num, den), (i, &x)| {
                    let t = i as f64 - centre;
                    (num + t * (x - mean), den + t * t)
                });
            num / den
        }
        _ => 0.0,
    };

    let centre = (n as f64 - 1.0) / 2.0;
    for (i, value) in samples.iter_mut().enumerate() {
        *value -= mean + slope * (i as f64 - centre);
    }
}

/// Generate taper coefficients of the given type and length.
///
/// The taper is symmetric with unit weight in its flat section.
pub fn generate_taper(taper: TaperType, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let last = (length - 1) as f64;
    match taper {
        TaperType::Rectangular => vec![1.0; length],
        TaperType::Hann => (0..length)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / last).cos()))
            .collect(),
        TaperType::Tukey { alpha } => {
            if alpha <= 0.0 {
                return vec![1.0; length];
            }
            let alpha = alpha.min(1.0);
            let ramp = alpha * last / 2.0;
            (0..length)
                .map(|i| {
                    let x = i as f64;
                    let from_edge = x.min(last - x);
                    if from_edge < ramp {
                        0.5 * (1.0 - (PI * from_edge / ramp).cos())
                    } else {
                        1.0
                    }
                })
                .collect()
        }
    }
}

/// Multiply `samples` by `taper` element-wise.
pub fn apply_taper(samples: &mut [f64], taper: &[f64]) {
    for (value, weight) in samples.iter_mut().zip(taper) {
        *value *= weight;
    }
}
