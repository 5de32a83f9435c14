use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::prelude::{HvsrError, HvsrResult};

/// Counts-to-velocity coefficient of the 24-bit, +/-2.048 full-scale digitiser.
pub const T3W_CALIBRATION: f64 = 2.048 / 8_388_608.0;

/// Sensor axis of a three-component seismometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    NorthSouth,
    EastWest,
    Vertical,
}

impl Component {
    pub const ALL: [Component; 3] = [
        Component::NorthSouth,
        Component::EastWest,
        Component::Vertical,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Component::NorthSouth => "NS",
            Component::EastWest => "EW",
            Component::Vertical => "UD",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One decoded instrument capture: three synchronised velocity channels.
///
/// Immutable once built; every constructor enforces equal, non-empty channel
/// lengths and a positive sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    sample_rate: f64,
    start_time: DateTime<Utc>,
    ns: Vec<f64>,
    ew: Vec<f64>,
    ud: Vec<f64>,
}

impl Record {
    pub fn new(
        sample_rate: f64,
        start_time: DateTime<Utc>,
        ns: Vec<f64>,
        ew: Vec<f64>,
        ud: Vec<f64>,
    ) -> HvsrResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(HvsrError::InvalidRecord(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if ns.len() != ew.len() || ns.len() != ud.len() {
            return Err(HvsrError::InvalidRecord(format!(
                "channel lengths differ: NS {}, EW {}, UD {}",
                ns.len(),
                ew.len(),
                ud.len()
            )));
        }
        if ns.is_empty() {
            return Err(HvsrError::InvalidRecord("channels are empty".into()));
        }

        Ok(Self {
            sample_rate,
            start_time,
            ns,
            ew,
            ud,
        })
    }

    /// Builds a record from raw digitiser counts scaled by `calibration`.
    pub fn from_counts(
        sample_rate: f64,
        start_time: DateTime<Utc>,
        counts: [&[i32]; 3],
        calibration: f64,
    ) -> HvsrResult<Self> {
        if !(calibration.is_finite() && calibration != 0.0) {
            return Err(HvsrError::InvalidRecord(format!(
                "calibration coefficient must be finite and non-zero, got {}",
                calibration
            )));
        }
        let [ns, ew, ud] = counts.map(|channel| {
            channel
                .iter()
                .map(|&count| f64::from(count) * calibration)
                .collect::<Vec<_>>()
        });
        Self::new(sample_rate, start_time, ns, ew, ud)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ns.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate
    }

    /// Instant just after the last sample.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.time_at(self.duration_seconds())
    }

    /// Absolute time `offset_seconds` after the first sample.
    pub fn time_at(&self, offset_seconds: f64) -> DateTime<Utc> {
        let micros = (offset_seconds * 1e6).round() as i64;
        self.start_time + Duration::microseconds(micros)
    }

    pub fn channel(&self, component: Component) -> &[f64] {
        match component {
            Component::NorthSouth => &self.ns,
            Component::EastWest => &self.ew,
            Component::Vertical => &self.ud,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn record_rejects_mismatched_channels() {
        let err = Record::new(100.0, start(), vec![0.0; 4], vec![0.0; 4], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, HvsrError::InvalidRecord(_)));
    }

    #[test]
    fn record_rejects_non_positive_sample_rate() {
        for rate in [0.0, -1.0, f64::NAN] {
            let err = Record::new(rate, start(), vec![0.0], vec![0.0], vec![0.0]).unwrap_err();
            assert!(matches!(err, HvsrError::InvalidRecord(_)));
        }
    }

    #[test]
    fn record_rejects_empty_channels() {
        assert!(Record::new(100.0, start(), vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn record_reports_duration_and_end_time() {
        let record = Record::new(100.0, start(), vec![0.0; 250], vec![0.0; 250], vec![0.0; 250]).unwrap();
        assert_eq!(record.len(), 250);
        assert!((record.duration_seconds() - 2.5).abs() < 1e-12);
        assert_eq!(record.end_time(), start() + Duration::milliseconds(2500));
    }

    #[test]
    fn counts_are_scaled_by_calibration() {
        let record = Record::from_counts(
            100.0,
            start(),
            [&[8_388_608, 0], &[-4_194_304, 1], &[0, 2]],
            T3W_CALIBRATION,
        )
        .unwrap();
        assert!((record.channel(Component::NorthSouth)[0] - 2.048).abs() < 1e-12);
        assert!((record.channel(Component::EastWest)[0] + 1.024).abs() < 1e-12);
        assert_eq!(record.channel(Component::Vertical)[0], 0.0);
    }

    #[test]
    fn component_codes_follow_instrument_labels() {
        let codes: Vec<String> = Component::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(codes, vec!["NS", "EW", "UD"]);
    }
}
