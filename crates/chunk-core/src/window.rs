//! Date-based window selection over an ordered item sequence.
//!
//! The number of whole intervals elapsed since the anchor date picks the
//! window. Output depends only on the parameters and the supplied `now`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chunk_config::WindowPolicy;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("start must be a date (YYYY-MM-DD) or ISO-8601 datetime, got '{0}'")]
    InvalidAnchor(String),

    #[error("step (interval days) must be positive")]
    InvalidInterval,

    #[error("chunk (limit) must be positive")]
    InvalidChunkSize,
}

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    pub start: usize,
    pub end: usize,
}

impl ChunkWindow {
    pub const EMPTY: ChunkWindow = ChunkWindow { start: 0, end: 0 };

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        if self.is_empty() {
            return &[];
        }
        let end = self.end.min(items.len());
        let start = self.start.min(end);
        &items[start..end]
    }
}

/// Parse the anchor date. Dates mean UTC midnight; datetimes without an
/// offset are read as UTC; datetimes with an offset are converted to UTC.
pub fn parse_anchor(start: &str) -> Result<DateTime<Utc>, WindowError> {
    let start = start.trim();

    if let Ok(date) = NaiveDate::parse_from_str(start, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(start, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(WindowError::InvalidAnchor(start.to_string()))
}

/// Whole intervals between `anchor` and `now`, floored, never negative.
pub fn intervals_elapsed(
    anchor: DateTime<Utc>,
    interval_days: i64,
    now: DateTime<Utc>,
) -> Result<u64, WindowError> {
    if interval_days <= 0 {
        return Err(WindowError::InvalidInterval);
    }
    // An interval too long to express in seconds exceeds any representable elapsed time
    let Some(interval_secs) = interval_days.checked_mul(SECONDS_PER_DAY) else {
        return Ok(0);
    };

    let elapsed = (now - anchor).num_seconds();
    let intervals = elapsed.div_euclid(interval_secs);
    Ok(intervals.max(0) as u64)
}

pub fn select_window(
    policy: WindowPolicy,
    anchor: DateTime<Utc>,
    interval_days: i64,
    chunk_size: usize,
    total_len: usize,
    now: DateTime<Utc>,
) -> Result<ChunkWindow, WindowError> {
    if chunk_size == 0 {
        return Err(WindowError::InvalidChunkSize);
    }
    let intervals = intervals_elapsed(anchor, interval_days, now)?;

    Ok(match policy {
        WindowPolicy::Sliding => sliding_window(intervals, chunk_size, total_len),
        WindowPolicy::Cumulative => cumulative_window(intervals, chunk_size, total_len),
    })
}

fn sliding_window(intervals: u64, chunk_size: usize, total_len: usize) -> ChunkWindow {
    let start = usize::try_from(intervals)
        .ok()
        .and_then(|n| n.checked_mul(chunk_size))
        .unwrap_or(usize::MAX);
    if start >= total_len {
        return ChunkWindow::EMPTY;
    }
    ChunkWindow {
        start,
        end: start.saturating_add(chunk_size).min(total_len),
    }
}

/// The end bound is `(n + 1) * chunk - 1` capped at `total_len - 1` and used
/// as an exclusive bound, so a window never includes its last slot nor the
/// final item of the list. Kept exactly as deployed lists were served.
fn cumulative_window(intervals: u64, chunk_size: usize, total_len: usize) -> ChunkWindow {
    if total_len == 0 {
        return ChunkWindow::EMPTY;
    }
    let grown = usize::try_from(intervals)
        .ok()
        .and_then(|n| n.checked_add(1))
        .and_then(|n| n.checked_mul(chunk_size))
        .unwrap_or(usize::MAX);
    ChunkWindow {
        start: 0,
        end: (grown - 1).min(total_len - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn sliding(now: &str, total_len: usize) -> ChunkWindow {
        select_window(WindowPolicy::Sliding, parse_anchor("2024-01-01").unwrap(), 7, 10, total_len, utc(now)).unwrap()
    }

    fn cumulative(now: &str, total_len: usize) -> ChunkWindow {
        select_window(WindowPolicy::Cumulative, parse_anchor("2024-01-01").unwrap(), 7, 10, total_len, utc(now)).unwrap()
    }

    #[test]
    fn test_parse_anchor_date_is_utc_midnight() {
        assert_eq!(parse_anchor("2024-01-01").unwrap(), utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_parse_anchor_datetimes() {
        assert_eq!(parse_anchor("2024-01-01T12:30:00").unwrap(), utc("2024-01-01T12:30:00Z"));
        assert_eq!(parse_anchor("2024-01-01 12:30:00").unwrap(), utc("2024-01-01T12:30:00Z"));
        assert_eq!(parse_anchor("2024-01-01T12:30:00Z").unwrap(), utc("2024-01-01T12:30:00Z"));
        assert_eq!(parse_anchor("2024-01-01T12:30:00+02:00").unwrap(), utc("2024-01-01T10:30:00Z"));
    }

    #[test]
    fn test_parse_anchor_rejects_garbage() {
        assert!(matches!(parse_anchor("January 1st"), Err(WindowError::InvalidAnchor(_))));
        assert!(parse_anchor("2024-13-01").is_err());
        assert!(parse_anchor("").is_err());
    }

    #[test]
    fn test_intervals_elapsed_floors() {
        let anchor = utc("2024-01-01T00:00:00Z");
        assert_eq!(intervals_elapsed(anchor, 7, utc("2024-01-07T23:59:59Z")).unwrap(), 0);
        assert_eq!(intervals_elapsed(anchor, 7, utc("2024-01-08T00:00:00Z")).unwrap(), 1);
        assert_eq!(intervals_elapsed(anchor, 1, utc("2024-01-31T06:00:00Z")).unwrap(), 30);
    }

    #[test]
    fn test_before_anchor_maps_to_first_interval() {
        let anchor = utc("2024-01-01T00:00:00Z");
        assert_eq!(intervals_elapsed(anchor, 7, utc("2023-12-31T23:00:00Z")).unwrap(), 0);
        assert_eq!(intervals_elapsed(anchor, 7, utc("2020-01-01T00:00:00Z")).unwrap(), 0);
    }

    #[test]
    fn test_non_positive_interval_is_invalid() {
        let anchor = utc("2024-01-01T00:00:00Z");
        assert_eq!(intervals_elapsed(anchor, 0, anchor), Err(WindowError::InvalidInterval));
        assert_eq!(intervals_elapsed(anchor, -3, anchor), Err(WindowError::InvalidInterval));
    }

    #[test]
    fn test_huge_interval_stays_in_first_window() {
        let anchor = utc("2024-01-01T00:00:00Z");
        let now = utc("2099-06-01T00:00:00Z");
        assert_eq!(intervals_elapsed(anchor, 200_000_000_000_000, now), Ok(0));
        assert_eq!(intervals_elapsed(anchor, i64::MAX, now), Ok(0));

        let window = select_window(WindowPolicy::Sliding, anchor, 200_000_000_000_000, 10, 35, now).unwrap();
        assert_eq!(window, ChunkWindow { start: 0, end: 10 });
    }

    #[test]
    fn test_zero_chunk_is_invalid() {
        let anchor = utc("2024-01-01T00:00:00Z");
        let err = select_window(WindowPolicy::Sliding, anchor, 7, 0, 10, anchor).unwrap_err();
        assert_eq!(err, WindowError::InvalidChunkSize);
    }

    #[test]
    fn test_sliding_window_advances() {
        assert_eq!(sliding("2024-01-01T00:00:00Z", 35), ChunkWindow { start: 0, end: 10 });
        assert_eq!(sliding("2024-01-08T00:00:00Z", 35), ChunkWindow { start: 10, end: 20 });
        assert_eq!(sliding("2024-01-15T00:00:00Z", 35), ChunkWindow { start: 20, end: 30 });
    }

    #[test]
    fn test_sliding_window_last_chunk_is_clamped() {
        assert_eq!(sliding("2024-01-22T00:00:00Z", 35), ChunkWindow { start: 30, end: 35 });
    }

    #[test]
    fn test_sliding_window_past_end_is_empty() {
        assert_eq!(sliding("2024-01-29T00:00:00Z", 35), ChunkWindow::EMPTY);
        assert_eq!(sliding("2099-01-01T00:00:00Z", 35), ChunkWindow::EMPTY);
        assert_eq!(sliding("2024-01-01T00:00:00Z", 0), ChunkWindow::EMPTY);
    }

    #[test]
    fn test_sliding_window_before_anchor_is_first_chunk() {
        assert_eq!(sliding("2023-06-01T00:00:00Z", 35), ChunkWindow { start: 0, end: 10 });
    }

    #[test]
    fn test_cumulative_window_grows_from_zero() {
        assert_eq!(cumulative("2024-01-01T00:00:00Z", 35), ChunkWindow { start: 0, end: 9 });
        assert_eq!(cumulative("2024-01-08T00:00:00Z", 35), ChunkWindow { start: 0, end: 19 });
        assert_eq!(cumulative("2024-01-15T00:00:00Z", 35), ChunkWindow { start: 0, end: 29 });
    }

    #[test]
    fn test_cumulative_window_end_is_one_short_of_full_chunk() {
        // The growth bound is applied as exclusive, so each window holds chunk*(n+1) - 1 items
        let window = cumulative("2024-01-08T00:00:00Z", 35);
        assert_eq!(window.len(), 19);
    }

    #[test]
    fn test_cumulative_window_never_reaches_last_item() {
        assert_eq!(cumulative("2024-01-22T00:00:00Z", 35), ChunkWindow { start: 0, end: 34 });
        assert_eq!(cumulative("2099-01-01T00:00:00Z", 35), ChunkWindow { start: 0, end: 34 });
    }

    #[test]
    fn test_cumulative_window_small_lists() {
        assert_eq!(cumulative("2024-01-01T00:00:00Z", 0), ChunkWindow::EMPTY);
        assert_eq!(cumulative("2024-01-01T00:00:00Z", 1), ChunkWindow { start: 0, end: 0 });
        let anchor = utc("2024-01-01T00:00:00Z");
        let single = select_window(WindowPolicy::Cumulative, anchor, 7, 1, 10, anchor).unwrap();
        assert!(single.is_empty());
    }

    #[test]
    fn test_selection_is_repeatable() {
        let first = sliding("2024-02-03T10:00:00Z", 100);
        let second = sliding("2024-02-03T10:00:00Z", 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_huge_interval_count_does_not_overflow() {
        let anchor = utc("1970-01-01T00:00:00Z");
        let now = utc("9999-01-01T00:00:00Z");
        let window = select_window(WindowPolicy::Sliding, anchor, 1, usize::MAX, 10, now).unwrap();
        assert_eq!(window, ChunkWindow::EMPTY);
        let window = select_window(WindowPolicy::Cumulative, anchor, 1, usize::MAX, 10, now).unwrap();
        assert_eq!(window, ChunkWindow { start: 0, end: 9 });
    }

    #[test]
    fn test_slice_respects_bounds() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(ChunkWindow { start: 1, end: 3 }.slice(&items), &[2, 3]);
        assert_eq!(ChunkWindow { start: 3, end: 99 }.slice(&items), &[4, 5]);
        assert!(ChunkWindow::EMPTY.slice(&items).is_empty());
    }
}
