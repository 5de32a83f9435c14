//! Konno-Ohmachi log-frequency smoothing.
//!
//! The window for a centre frequency `fc` is
//! `w(f) = [sin(b * log10(f / fc)) / (b * log10(f / fc))]^4`, evaluated over
//! its main lobe `fc * 10^(-pi/b) .. fc * 10^(pi/b)`. A constant bandwidth `b`
//! gives a constant width on a logarithmic axis, so low frequencies are
//! averaged over few bins and high frequencies over many.

use std::f64::consts::PI;

/// Konno-Ohmachi weight of `frequency` for the window centred on `centre`.
#[inline]
pub fn konno_ohmachi_weight(frequency: f64, centre: f64, bandwidth: f64) -> f64 {
    if frequency == centre {
        return 1.0;
    }
    let x = bandwidth * (frequency / centre).log10();
    if x.abs() >= PI {
        return 0.0;
    }
    let sinc = x.sin() / x;
    sinc.powi(4)
}

/// Smooth `amplitudes` sampled at the strictly increasing `frequencies`,
/// returning a spectrum on the same grid.
///
/// Bins at or below 0 Hz have no log-frequency neighbourhood and are copied
/// through unchanged.
pub fn konno_ohmachi(frequencies: &[f64], amplitudes: &[f64], bandwidth: f64) -> Vec<f64> {
    let spread = 10f64.powf(PI / bandwidth);
    let mut smoothed = Vec::with_capacity(amplitudes.len());

    for (&centre, &raw) in frequencies.iter().zip(amplitudes) {
        if centre <= 0.0 {
            smoothed.push(raw);
            continue;
        }

        let lower = centre / spread;
        let upper = centre * spread;
        let first = frequencies.partition_point(|&f| f <= lower.max(0.0));
        let last = frequencies.partition_point(|&f| f < upper);

        let (weighted, total) = frequencies[first..last]
            .iter()
            .zip(&amplitudes[first..last])
            .fold((0.0, 0.0), |(weighted, total), (&f, &a)| {
                let w = konno_ohmachi_weight(f, centre, bandwidth);
                (weighted + w * a, total + w)
            });

        smoothed.push(if total > 0.0 { weighted / total } else { raw });
    }

    smoothed
}
