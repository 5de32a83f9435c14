use serde::{Deserialize, Serialize};

use crate::math::interp::is_strictly_increasing;
use crate::prelude::{HvsrError, HvsrResult};

/// H/V ratio per frequency; `None` marks an undefined bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvsrCurve {
    frequencies: Vec<f64>,
    values: Vec<Option<f64>>,
}

impl HvsrCurve {
    pub fn new(frequencies: Vec<f64>, values: Vec<Option<f64>>) -> HvsrResult<Self> {
        if frequencies.len() != values.len() {
            return Err(HvsrError::InvalidInput(format!(
                "curve has {} frequencies but {} values",
                frequencies.len(),
                values.len()
            )));
        }
        if !is_strictly_increasing(&frequencies) {
            return Err(HvsrError::InvalidInput(
                "curve frequencies must be finite and strictly increasing".into(),
            ));
        }
        if values
            .iter()
            .flatten()
            .any(|v| !(v.is_finite() && *v >= 0.0))
        {
            return Err(HvsrError::InvalidInput(
                "defined curve values must be finite and non-negative".into(),
            ));
        }
        Ok(Self {
            frequencies,
            values,
        })
    }

    /// Built by the pipeline, which upholds the invariants itself.
    pub(crate) fn from_parts(frequencies: Vec<f64>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(frequencies.len(), values.len());
        Self {
            frequencies,
            values,
        }
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn is_fully_undefined(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}
