use chrono::{DateTime, Utc};

use super::{Component, Record};

/// A fixed-length view into a [`Record`]; no samples are copied.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    record: &'a Record,
    index: usize,
    start: usize,
    len: usize,
}

impl<'a> Window<'a> {
    /// Callers guarantee `start + len <= record.len()`.
    pub(crate) fn new(record: &'a Record, index: usize, start: usize, len: usize) -> Self {
        debug_assert!(start + len <= record.len());
        Self {
            record,
            index,
            start,
            len,
        }
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// Position of this window in the windowing sequence, counting rejected ones.
    pub fn index(&self) -> usize {
        self.index
    }

    /// First sample of the window within the record.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sample_rate(&self) -> f64 {
        self.record.sample_rate()
    }

    pub fn start_seconds(&self) -> f64 {
        self.start as f64 / self.record.sample_rate()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.record.time_at(self.start_seconds())
    }

    pub fn samples(&self, component: Component) -> &'a [f64] {
        &self.record.channel(component)[self.start..self.start + self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_slices_every_channel() {
        let ns: Vec<f64> = (0..10).map(f64::from).collect();
        let ew: Vec<f64> = ns.iter().map(|v| v * 2.0).collect();
        let ud: Vec<f64> = ns.iter().map(|v| -v).collect();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = Record::new(2.0, start, ns, ew, ud).unwrap();

        let window = Window::new(&record, 1, 4, 3);
        assert_eq!(window.samples(Component::NorthSouth), &[4.0, 5.0, 6.0]);
        assert_eq!(window.samples(Component::EastWest), &[8.0, 10.0, 12.0]);
        assert_eq!(window.samples(Component::Vertical), &[-4.0, -5.0, -6.0]);
        assert_eq!(window.start_seconds(), 2.0);
        assert_eq!(window.start_time(), start + chrono::Duration::seconds(2));
    }
}
