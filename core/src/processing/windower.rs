use std::fmt;

use crate::prelude::{HvsrError, HvsrResult};
use crate::processing::quality::{QualityCheck, QualityVerdict};
use crate::record::{Record, Window};
use crate::telemetry::log::LogManager;

/// A window dropped before spectral estimation, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedWindow {
    pub index: usize,
    pub start_seconds: f64,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Quality(String),
    EstimationFailed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Quality(reason) => write!(f, "quality: {}", reason),
            RejectReason::EstimationFailed(reason) => write!(f, "estimation failed: {}", reason),
        }
    }
}

/// Windows cut from one record, split into accepted and rejected.
#[derive(Debug, Clone)]
pub struct WindowSet<'a> {
    pub accepted: Vec<Window<'a>>,
    pub rejected: Vec<RejectedWindow>,
    pub window_samples: usize,
}

/// Cuts a record into fixed-length windows at a fixed stride.
///
/// Window length is `round(duration * sample_rate)` samples and the stride is
/// `round(length * (1 - overlap))`, at least one sample. A trailing window
/// that would run past the record is dropped, never padded.
#[derive(Debug, Clone, Copy)]
pub struct Windower {
    window_samples: usize,
    stride: usize,
    logger: LogManager,
}

impl Windower {
    pub fn new(record: &Record, window_duration: f64, overlap_fraction: f64) -> HvsrResult<Self> {
        if !(window_duration.is_finite() && window_duration > 0.0) {
            return Err(HvsrError::InvalidConfig(format!(
                "window duration must be positive, got {}",
                window_duration
            )));
        }
        if !(0.0..1.0).contains(&overlap_fraction) {
            return Err(HvsrError::InvalidConfig(format!(
                "overlap fraction must lie in [0, 1), got {}",
                overlap_fraction
            )));
        }

        let window_samples = (window_duration * record.sample_rate()).round() as usize;
        if window_samples == 0 {
            return Err(HvsrError::InvalidConfig(format!(
                "{} s at {} Hz is shorter than one sample",
                window_duration,
                record.sample_rate()
            )));
        }
        if window_samples > record.len() {
            return Err(HvsrError::InvalidConfig(format!(
                "window of {} samples exceeds record of {} samples",
                window_samples,
                record.len()
            )));
        }

        let stride = ((window_samples as f64 * (1.0 - overlap_fraction)).round() as usize).max(1);
        Ok(Self {
            window_samples,
            stride,
            logger: LogManager::new("windower"),
        })
    }

    pub fn window_samples(&self) -> usize {
        self.window_samples
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of full windows the record holds, before quality checks.
    pub fn window_count(&self, record: &Record) -> usize {
        (record.len() - self.window_samples) / self.stride + 1
    }

    /// Cut `record` into windows, dropping those `check` rejects.
    pub fn split<'a>(
        &self,
        record: &'a Record,
        check: Option<&dyn QualityCheck>,
    ) -> WindowSet<'a> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for index in 0..self.window_count(record) {
            let window = Window::new(record, index, index * self.stride, self.window_samples);
            match check.map_or(QualityVerdict::Accept, |check| check.check(&window)) {
                QualityVerdict::Accept => accepted.push(window),
                QualityVerdict::Reject(reason) => {
                    self.logger
                        .detail(&format!("window {} rejected: {}", index, reason));
                    rejected.push(RejectedWindow {
                        index,
                        start_seconds: window.start_seconds(),
                        reason: RejectReason::Quality(reason),
                    });
                }
            }
        }

        WindowSet {
            accepted,
            rejected,
            window_samples: self.window_samples,
        }
    }
}

/// One-shot form of [`Windower::split`].
pub fn window<'a>(
    record: &'a Record,
    window_duration: f64,
    overlap_fraction: f64,
    check: Option<&dyn QualityCheck>,
) -> HvsrResult<WindowSet<'a>> {
    let windower = Windower::new(record, window_duration, overlap_fraction)?;
    Ok(windower.split(record, check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Component;
    use chrono::{TimeZone, Utc};

    fn ramp_record(len: usize, sample_rate: f64) -> Record {
        let ns: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Record::new(sample_rate, start, ns.clone(), ns.clone(), ns).unwrap()
    }

    #[test]
    fn half_overlap_produces_expected_starts() {
        let record = ramp_record(6000, 100.0);
        let set = window(&record, 20.0, 0.5, None).unwrap();
        let starts: Vec<usize> = set.accepted.iter().map(|w| w.start()).collect();
        assert_eq!(starts, vec![0, 1000, 2000, 3000, 4000]);
        assert!(set.accepted.iter().all(|w| w.len() == 2000));
        assert_eq!(set.window_samples, 2000);
    }

    #[test]
    fn trailing_partial_window_is_dropped() {
        let record = ramp_record(250, 10.0);
        let set = window(&record, 10.0, 0.0, None).unwrap();
        assert_eq!(set.accepted.len(), 2);
        let last = set.accepted.last().unwrap();
        assert_eq!(last.samples(Component::Vertical)[99], 199.0);
    }

    #[test]
    fn window_longer_than_record_is_rejected() {
        let record = ramp_record(100, 10.0);
        assert!(matches!(
            window(&record, 10.5, 0.0, None),
            Err(HvsrError::InvalidConfig(_))
        ));
    }

    #[test]
    fn invalid_overlap_is_rejected() {
        let record = ramp_record(100, 10.0);
        assert!(window(&record, 1.0, 1.0, None).is_err());
        assert!(window(&record, 1.0, -0.1, None).is_err());
        assert!(window(&record, 0.0, 0.0, None).is_err());
    }

    fn reject_all(_: &Window<'_>) -> bool {
        false
    }

    #[test]
    fn rejecting_every_window_yields_empty_set() {
        let record = ramp_record(100, 10.0);
        let set = window(&record, 2.0, 0.0, Some(&reject_all as &dyn QualityCheck)).unwrap();
        assert!(set.accepted.is_empty());
        assert_eq!(set.rejected.len(), 5);
        assert_eq!(set.rejected[2].start_seconds, 4.0);
    }
}
