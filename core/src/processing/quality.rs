use crate::math::stats::StatsHelper;
use crate::prelude::{QualityConfig, StaLtaConfig};
use crate::record::{Component, Window};

/// Outcome of a window quality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityVerdict {
    Accept,
    Reject(String),
}

impl QualityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, QualityVerdict::Accept)
    }
}

/// Predicate deciding whether a window is stationary enough to analyse.
pub trait QualityCheck: Sync {
    fn check(&self, window: &Window<'_>) -> QualityVerdict;
}

impl<F> QualityCheck for F
where
    F: Fn(&Window<'_>) -> bool + Sync,
{
    fn check(&self, window: &Window<'_>) -> QualityVerdict {
        if self(window) {
            QualityVerdict::Accept
        } else {
            QualityVerdict::Reject("rejected by caller predicate".into())
        }
    }
}

/// Rejects windows holding a transient above `max_abs` on any channel.
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeLimit {
    pub max_abs: f64,
}

impl QualityCheck for AmplitudeLimit {
    fn check(&self, window: &Window<'_>) -> QualityVerdict {
        for component in Component::ALL {
            let peak = StatsHelper::max_abs(window.samples(component));
            if peak > self.max_abs {
                return QualityVerdict::Reject(format!(
                    "{} amplitude {:.4e} exceeds {:.4e}",
                    component, peak, self.max_abs
                ));
            }
        }
        QualityVerdict::Accept
    }
}

/// Short-term average of |x| over consecutive `sta_seconds` segments, divided
/// by the average over the whole window; any segment ratio outside
/// `[min_ratio, max_ratio]` on any channel rejects the window.
#[derive(Debug, Clone, Copy)]
pub struct StaLtaLimit {
    pub sta_seconds: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl From<StaLtaConfig> for StaLtaLimit {
    fn from(config: StaLtaConfig) -> Self {
        Self {
            sta_seconds: config.sta_seconds,
            min_ratio: config.min_ratio,
            max_ratio: config.max_ratio,
        }
    }
}

impl QualityCheck for StaLtaLimit {
    fn check(&self, window: &Window<'_>) -> QualityVerdict {
        let sta_len = ((self.sta_seconds * window.sample_rate()).round() as usize).max(1);
        for component in Component::ALL {
            let samples = window.samples(component);
            let lta = StatsHelper::mean_abs(samples);
            if lta <= 0.0 {
                continue;
            }
            for segment in samples.chunks(sta_len) {
                if segment.len() < sta_len {
                    break;
                }
                let ratio = StatsHelper::mean_abs(segment) / lta;
                if ratio < self.min_ratio || ratio > self.max_ratio {
                    return QualityVerdict::Reject(format!(
                        "{} STA/LTA ratio {:.3} outside [{}, {}]",
                        component, ratio, self.min_ratio, self.max_ratio
                    ));
                }
            }
        }
        QualityVerdict::Accept
    }
}

struct ByRef<'c>(&'c dyn QualityCheck);

impl QualityCheck for ByRef<'_> {
    fn check(&self, window: &Window<'_>) -> QualityVerdict {
        self.0.check(window)
    }
}

/// Every configured check; the first rejection wins.
#[derive(Default)]
pub struct QualitySuite<'c> {
    checks: Vec<Box<dyn QualityCheck + 'c>>,
}

impl<'c> QualitySuite<'c> {
    pub fn from_config(config: &QualityConfig) -> Self {
        let mut suite = Self::default();
        if let Some(max_abs) = config.max_amplitude {
            suite.push(AmplitudeLimit { max_abs });
        }
        if let Some(sta_lta) = config.sta_lta {
            suite.push(StaLtaLimit::from(sta_lta));
        }
        suite
    }

    pub fn push(&mut self, check: impl QualityCheck + 'c) {
        self.checks.push(Box::new(check));
    }

    /// Add a check owned by the caller.
    pub fn push_ref(&mut self, check: &'c dyn QualityCheck) {
        self.checks.push(Box::new(ByRef(check)));
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }
}

impl QualityCheck for QualitySuite<'_> {
    fn check(&self, window: &Window<'_>) -> QualityVerdict {
        self.checks
            .iter()
            .map(|check| check.check(window))
            .find(|verdict| !verdict.is_accepted())
            .unwrap_or(QualityVerdict::Accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use chrono::{TimeZone, Utc};

    fn record_with_spike() -> Record {
        let mut ns = vec![0.1; 100];
        ns[50] = 5.0;
        let ew: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 0.1 } else { -0.1 }).collect();
        let ud = ew.clone();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Record::new(10.0, start, ns, ew, ud).unwrap()
    }

    #[test]
    fn amplitude_limit_rejects_spike() {
        let record = record_with_spike();
        let check = AmplitudeLimit { max_abs: 1.0 };
        assert!(check.check(&Window::new(&record, 0, 0, 40)).is_accepted());
        let verdict = check.check(&Window::new(&record, 1, 40, 40));
        assert!(matches!(verdict, QualityVerdict::Reject(reason) if reason.starts_with("NS")));
    }

    #[test]
    fn sta_lta_rejects_transient() {
        let record = record_with_spike();
        let check = StaLtaLimit {
            sta_seconds: 0.5,
            min_ratio: 0.2,
            max_ratio: 2.5,
        };
        assert!(check.check(&Window::new(&record, 0, 0, 40)).is_accepted());
        assert!(!check.check(&Window::new(&record, 1, 40, 40)).is_accepted());
    }

    fn only_first(window: &Window<'_>) -> bool {
        window.index() == 0
    }

    #[test]
    fn predicates_act_as_checks() {
        let record = record_with_spike();
        assert!(only_first.check(&Window::new(&record, 0, 0, 10)).is_accepted());
        assert!(!only_first.check(&Window::new(&record, 3, 30, 10)).is_accepted());
    }

    #[test]
    fn suite_builds_from_config() {
        let config = QualityConfig {
            max_amplitude: Some(1.0),
            sta_lta: Some(StaLtaConfig {
                sta_seconds: 1.0,
                min_ratio: 0.1,
                max_ratio: 3.0,
            }),
        };
        let suite = QualitySuite::from_config(&config);
        assert_eq!(suite.len(), 2);
        let record = record_with_spike();
        assert!(!suite.check(&Window::new(&record, 1, 40, 40)).is_accepted());
        assert!(QualitySuite::from_config(&QualityConfig::default()).is_empty());
    }
}
