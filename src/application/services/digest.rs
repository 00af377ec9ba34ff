//! Event/digest aggregation
//!
//! Window computation anchors on "now" in the organization's configured
//! zone, never the process-local zone - otherwise a digest generated near
//! midnight or across a DST transition picks up the wrong day's events.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::entities::Event;

/// Bounds of a digest window: local midnight of "now" in `tz`, spanning
/// `days` whole local days. Returned as instants, end exclusive.
pub fn window_bounds(now: DateTime<Utc>, tz: Tz, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(&tz).date_naive();
    let start = local_midnight(&tz, today);
    let end = local_midnight(&tz, today + Duration::days(days));
    (start.with_timezone(&Utc), end.with_timezone(&Utc))
}

/// Midnight of `date` in `tz`. A DST gap that removes midnight resolves to
/// the earliest valid local time of that day; an ambiguous midnight takes
/// the earlier offset.
fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight)),
    }
}

/// Select the events falling inside the digest window, chronological.
///
/// Pure function of `(now, tz, events, days)`: same inputs, same digest.
/// An empty event set yields an empty, non-error digest.
pub fn select_digest(events: &[Event], now: DateTime<Utc>, tz: Tz, days: i64) -> Vec<Event> {
    let (start, end) = window_bounds(now, tz, days);
    let mut selected: Vec<Event> = events
        .iter()
        .filter(|e| e.starts_at >= start && e.starts_at < end)
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.title.cmp(&b.title)));
    selected
}

/// Events at or after `now`, chronological. Backs the /events listing.
pub fn upcoming(events: &[Event], now: DateTime<Utc>) -> Vec<Event> {
    let mut selected: Vec<Event> = events
        .iter()
        .filter(|e| e.starts_at >= now)
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.title.cmp(&b.title)));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Moscow;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().expect("test timestamp")
    }

    #[test]
    fn empty_event_set_yields_empty_digest() {
        let digest = select_digest(&[], utc("2026-03-10T12:00:00Z"), Moscow, 7);
        assert!(digest.is_empty());
    }

    #[test]
    fn one_day_window_respects_the_local_day_boundary() {
        // 23:30 and 00:30 local Moscow time around the 10/11 March boundary.
        // In UTC both fall on 10 March, but only the first is inside a
        // one-day window anchored on 10 March local.
        let late_on_the_10th = Moscow
            .with_ymd_and_hms(2026, 3, 10, 23, 30, 0)
            .single()
            .expect("valid local time")
            .with_timezone(&Utc);
        let early_on_the_11th = Moscow
            .with_ymd_and_hms(2026, 3, 11, 0, 30, 0)
            .single()
            .expect("valid local time")
            .with_timezone(&Utc);
        assert_eq!(late_on_the_10th.date_naive(), early_on_the_11th.date_naive());

        let events = vec![
            Event::new("late standup", late_on_the_10th),
            Event::new("night deploy", early_on_the_11th),
        ];
        let now = Moscow
            .with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
            .single()
            .expect("valid local time")
            .with_timezone(&Utc);

        let digest = select_digest(&events, now, Moscow, 1);
        assert_eq!(digest.len(), 1);
        assert_eq!(digest[0].title, "late standup");
    }

    #[test]
    fn digest_is_chronological_and_reproducible() {
        let events = vec![
            Event::new("b", utc("2026-03-10T15:00:00Z")),
            Event::new("a", utc("2026-03-10T09:00:00Z")),
            Event::new("same-instant-z", utc("2026-03-10T09:00:00Z")),
        ];
        let now = utc("2026-03-10T06:00:00Z");

        let digest = select_digest(&events, now, Moscow, 7);
        let titles: Vec<&str> = digest.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "same-instant-z", "b"]);
        assert_eq!(select_digest(&events, now, Moscow, 7), digest);
    }

    #[test]
    fn upcoming_excludes_the_past() {
        let events = vec![
            Event::new("past", utc("2026-03-09T10:00:00Z")),
            Event::new("future", utc("2026-03-11T10:00:00Z")),
        ];
        let up = upcoming(&events, utc("2026-03-10T00:00:00Z"));
        assert_eq!(up.len(), 1);
        assert_eq!(up[0].title, "future");
    }

    #[test]
    fn window_bounds_cover_whole_local_days() {
        let (start, end) = window_bounds(utc("2026-03-10T12:00:00Z"), Moscow, 1);
        // Moscow is UTC+3 year-round.
        assert_eq!(start, utc("2026-03-09T21:00:00Z"));
        assert_eq!(end, utc("2026-03-10T21:00:00Z"));
    }
}
