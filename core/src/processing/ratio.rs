use crate::math::interp::grids_match;
use crate::prelude::{HorizontalCombination, HvsrConfig, HvsrError, HvsrResult};
use crate::processing::curve::HvsrCurve;
use crate::processing::spectrum::Spectrum;

/// Forms the horizontal-to-vertical ratio of one window's three spectra.
#[derive(Debug, Clone, Copy)]
pub struct RatioComputer {
    rule: HorizontalCombination,
    epsilon: f64,
}

impl RatioComputer {
    pub fn new(rule: HorizontalCombination, epsilon: f64) -> Self {
        Self { rule, epsilon }
    }

    pub fn from_config(config: &HvsrConfig) -> Self {
        Self::new(config.horizontal_combination_rule, config.epsilon)
    }

    /// Bins where the vertical amplitude is at or below `epsilon` come back
    /// undefined rather than infinite.
    pub fn combine(
        &self,
        ns: &Spectrum,
        ew: &Spectrum,
        ud: &Spectrum,
    ) -> HvsrResult<HvsrCurve> {
        for (label, other) in [("EW", ew), ("UD", ud)] {
            if !grids_match(ns.frequencies(), other.frequencies()) {
                return Err(HvsrError::GridMismatch(format!(
                    "NS grid has {} bins, {} grid has {} bins or different frequencies",
                    ns.len(),
                    label,
                    other.len()
                )));
            }
        }

        let values = ns
            .amplitudes()
            .iter()
            .zip(ew.amplitudes())
            .zip(ud.amplitudes())
            .map(|((&n, &e), &v)| {
                if v > self.epsilon {
                    Some(self.rule.combine(n, e) / v).filter(|ratio| ratio.is_finite())
                } else {
                    None
                }
            })
            .collect();

        Ok(HvsrCurve::from_parts(ns.frequencies().to_vec(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(amplitudes: &[f64]) -> Spectrum {
        let freqs = (0..amplitudes.len()).map(|i| i as f64 * 0.5).collect();
        Spectrum::new(freqs, amplitudes.to_vec()).unwrap()
    }

    #[test]
    fn rms_ratio_matches_formula() {
        let computer = RatioComputer::new(HorizontalCombination::Rms, 1e-12);
        let curve = computer
            .combine(&spectrum(&[3.0, 1.0]), &spectrum(&[4.0, 1.0]), &spectrum(&[2.0, 0.5]))
            .unwrap();
        assert!((curve.values()[0].unwrap() - 12.5f64.sqrt() / 2.0).abs() < 1e-12);
        assert!((curve.values()[1].unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_grids_fail() {
        let computer = RatioComputer::new(HorizontalCombination::Rms, 1e-12);
        let short = spectrum(&[1.0, 1.0]);
        let long = spectrum(&[1.0, 1.0, 1.0]);
        assert!(matches!(
            computer.combine(&short, &short, &long),
            Err(HvsrError::GridMismatch(_))
        ));

        let shifted = Spectrum::new(vec![0.0, 0.7], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            computer.combine(&short, &shifted, &short),
            Err(HvsrError::GridMismatch(_))
        ));
    }

    #[test]
    fn zero_vertical_leaves_every_bin_undefined() {
        let computer = RatioComputer::new(HorizontalCombination::Rms, 1e-12);
        let curve = computer
            .combine(&spectrum(&[1.0; 5]), &spectrum(&[2.0; 5]), &spectrum(&[0.0; 5]))
            .unwrap();
        assert!(curve.is_fully_undefined());
        assert_eq!(curve.len(), 5);
    }

    #[test]
    fn epsilon_is_inclusive() {
        let computer = RatioComputer::new(HorizontalCombination::Max, 0.1);
        let curve = computer
            .combine(&spectrum(&[1.0, 1.0]), &spectrum(&[1.0, 1.0]), &spectrum(&[0.1, 0.2]))
            .unwrap();
        assert_eq!(curve.values()[0], None);
        assert!((curve.values()[1].unwrap() - 5.0).abs() < 1e-12);
    }
}
