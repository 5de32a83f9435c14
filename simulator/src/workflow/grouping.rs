use chrono::{DateTime, Utc};

/// Splits records into continuous recording sessions.
///
/// `spans` holds each record's `(start, end)`. Records are visited in start
/// order and a record joins the open session when it starts no more than
/// `max_gap_seconds` after the latest end seen in that session. Returns
/// indices into `spans`, one vector per session, each in start order.
pub fn group_sessions(
    spans: &[(DateTime<Utc>, DateTime<Utc>)],
    max_gap_seconds: f64,
) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&index| spans[index].0);

    let mut sessions: Vec<Vec<usize>> = Vec::new();
    let mut session_end: Option<DateTime<Utc>> = None;

    for index in order {
        let (start, end) = spans[index];
        let continues = session_end.map_or(false, |previous| {
            (start - previous).num_milliseconds() as f64 / 1000.0 <= max_gap_seconds
        });
        match sessions.last_mut() {
            Some(current) if continues => current.push(index),
            _ => sessions.push(vec![index]),
        }
        session_end = Some(match session_end {
            Some(previous) if continues => previous.max(end),
            _ => end,
        });
    }

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn span(start_minute: i64, length_minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let start = base + Duration::minutes(start_minute);
        (start, start + Duration::minutes(length_minutes))
    }

    #[test]
    fn consecutive_files_form_one_session() {
        let spans = vec![span(0, 5), span(5, 5), span(10, 5)];
        assert_eq!(group_sessions(&spans, 1.0), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn gap_starts_new_session_and_order_is_by_start() {
        let spans = vec![span(30, 5), span(0, 5), span(5, 5)];
        assert_eq!(group_sessions(&spans, 1.0), vec![vec![1, 2], vec![0]]);
    }

    #[test]
    fn overlapping_records_stay_together() {
        let spans = vec![span(0, 10), span(2, 3), span(9, 5)];
        assert_eq!(group_sessions(&spans, 0.0), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn no_records_no_sessions() {
        assert!(group_sessions(&[], 1.0).is_empty());
    }
}
