/// Summary of the natural logarithms of a set of positive values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogStats {
    pub mean: f64,
    /// Population standard deviation (divides by the sample count).
    pub std: f64,
    pub count: usize,
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn mean_abs(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().map(|v| v.abs()).sum::<f64>() / samples.len() as f64
    }

    pub fn max_abs(samples: &[f64]) -> f64 {
        samples.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Mean and spread of `ln(value)`; `None` when `logs` is empty.
    ///
    /// Identical inputs return that value exactly with zero spread.
    pub fn log_stats(logs: &[f64]) -> Option<LogStats> {
        let first = *logs.first()?;
        let count = logs.len();
        if logs.iter().all(|&v| v == first) {
            return Some(LogStats {
                mean: first,
                std: 0.0,
                count,
            });
        }
        let mean = Self::mean(logs);
        let variance = logs.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        Some(LogStats {
            mean,
            std: variance.sqrt(),
            count,
        })
    }

    /// Median of finite values; `None` when empty.
    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_helpers_ignore_sign() {
        assert_eq!(StatsHelper::mean_abs(&[-2.0, 1.0, -3.0]), 2.0);
        assert_eq!(StatsHelper::max_abs(&[0.5, -4.0, 3.0]), 4.0);
        assert_eq!(StatsHelper::mean_abs(&[]), 0.0);
    }

    #[test]
    fn log_stats_of_identical_values_have_no_spread() {
        let logs = vec![0.3_f64.ln(); 7];
        let stats = StatsHelper::log_stats(&logs).unwrap();
        assert_eq!(stats.mean, 0.3_f64.ln());
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.count, 7);
    }

    #[test]
    fn log_stats_use_population_deviation() {
        let stats = StatsHelper::log_stats(&[1.0, 3.0]).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std, 1.0);
        assert!(StatsHelper::log_stats(&[]).is_none());
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(StatsHelper::median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(StatsHelper::median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(StatsHelper::median(&[]), None);
    }
}
