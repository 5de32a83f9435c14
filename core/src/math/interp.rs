//! Frequency-grid comparison and resampling of ratio curves.

/// Relative tolerance under which two grid frequencies are the same bin.
const GRID_TOLERANCE: f64 = 1e-9;

/// Whether two frequency grids hold the same bins.
pub fn grids_match(lhs: &[f64], rhs: &[f64]) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(a, b)| (a - b).abs() <= GRID_TOLERANCE * a.abs().max(b.abs()).max(1.0))
}

pub fn is_strictly_increasing(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|pair| pair[0] < pair[1])
}

/// `points` frequencies spaced evenly in log between `min` and `max` inclusive.
pub fn log_space(min: f64, max: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let (lo, hi) = (min.ln(), max.ln());
            let step = (hi - lo) / (points - 1) as f64;
            (0..points)
                .map(|i| {
                    if i == points - 1 {
                        max
                    } else {
                        (lo + step * i as f64).exp()
                    }
                })
                .collect()
        }
    }
}

/// Resample `values` defined on `frequencies` onto `targets`.
///
/// Interpolation is linear in frequency and linear in `ln(value)`. A target
/// that coincides with a source bin takes that bin's value unchanged. A target
/// outside the source grid, or bracketed by an undefined or non-positive
/// value, is undefined.
pub fn interpolate_log_amplitude(
    frequencies: &[f64],
    values: &[Option<f64>],
    targets: &[f64],
) -> Vec<Option<f64>> {
    targets
        .iter()
        .map(|&target| interpolate_single(frequencies, values, target))
        .collect()
}

fn interpolate_single(frequencies: &[f64], values: &[Option<f64>], target: f64) -> Option<f64> {
    let (&first, &last) = (frequencies.first()?, frequencies.last()?);
    let tolerance = GRID_TOLERANCE * target.abs().max(1.0);
    if target < first - tolerance || target > last + tolerance {
        return None;
    }

    let upper = frequencies.partition_point(|&f| f < target);
    if upper < frequencies.len() && (frequencies[upper] - target).abs() <= tolerance {
        return values[upper];
    }
    if upper > 0 && (frequencies[upper - 1] - target).abs() <= tolerance {
        return values[upper - 1];
    }
    if upper == 0 || upper >= frequencies.len() {
        return None;
    }

    let lower = upper - 1;
    let v0 = values[lower].filter(|&v| v > 0.0)?;
    let v1 = values[upper].filter(|&v| v > 0.0)?;
    let (f0, f1) = (frequencies[lower], frequencies[upper]);
    let frac = (target - f0) / (f1 - f0);
    Some((v0.ln() + frac * (v1.ln() - v0.ln())).exp())
}
