//! Scheduled push delivery
//!
//! Two standing jobs for the subscriber list: a digest at a fixed local
//! hour every day and a reminder shortly before each event. Firing times
//! are computed in the organization's zone, never the process-local one.
//! A delivery failure for one subscriber is logged and skipped; it never
//! blocks delivery to the rest and is never retried.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::application::services::digest;
use crate::domain::entities::Event;
use crate::domain::traits::Outbound;
use crate::infrastructure::orgdata::OrgDataStore;

/// Local hour the daily digest goes out.
const DIGEST_HOUR: u32 = 9;
/// How far ahead of an event its reminder fires.
const REMINDER_LEAD_MINUTES: i64 = 15;

enum Job {
    Digest,
    Reminder(Event),
}

/// Next instant at which the local wall clock in `tz` reads `at`, strictly
/// after `now`. A DST gap that removes the target time skips to the next
/// day on which it exists.
pub fn next_daily_fire(now: DateTime<Utc>, tz: Tz, at: NaiveTime) -> DateTime<Utc> {
    let mut date = now.with_timezone(&tz).date_naive();
    for _ in 0..3 {
        if let Some(dt) = tz.from_local_datetime(&date.and_time(at)).earliest() {
            let instant = dt.with_timezone(&Utc);
            if instant > now {
                return instant;
            }
        }
        date += Duration::days(1);
    }
    now + Duration::days(1)
}

/// The earliest upcoming reminder instant and its event. `None` once every
/// event is closer than the lead time or already past.
pub fn next_reminder(events: &[Event], now: DateTime<Utc>) -> Option<(DateTime<Utc>, Event)> {
    events
        .iter()
        .filter_map(|e| {
            let at = e.starts_at - Duration::minutes(REMINDER_LEAD_MINUTES);
            if at > now {
                Some((at, e.clone()))
            } else {
                None
            }
        })
        .min_by(|(a, ea), (b, eb)| a.cmp(b).then_with(|| ea.title.cmp(&eb.title)))
}

/// Long-running delivery loop. Sleeps until the nearest job, sends it to
/// every subscriber, recomputes. Returns immediately when nobody is
/// subscribed.
pub async fn run(outbound: Arc<dyn Outbound>, org: Arc<OrgDataStore>, tz: Tz, digest_days: i64) {
    let subscribers = org.subscribers().to_vec();
    if subscribers.is_empty() {
        tracing::info!("no subscribers configured, scheduled delivery disabled");
        return;
    }
    let digest_at = NaiveTime::from_hms_opt(DIGEST_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    tracing::info!(subscribers = subscribers.len(), "scheduled delivery running");

    loop {
        let now = Utc::now();
        let digest_fire = next_daily_fire(now, tz, digest_at);
        let (fire_at, job) = match next_reminder(org.events(), now) {
            Some((at, event)) if at < digest_fire => (at, Job::Reminder(event)),
            _ => (digest_fire, Job::Digest),
        };

        let wait = (fire_at - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        let text = match job {
            Job::Digest => render_digest(&org, Utc::now(), tz, digest_days),
            Job::Reminder(event) => Some(render_reminder(&event, tz)),
        };
        if let Some(text) = text {
            broadcast(outbound.as_ref(), &subscribers, &text).await;
        }

        // Step past the fire instant before recomputing.
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }
}

/// The pushed digest text, or `None` when the window is empty and there is
/// nothing worth waking subscribers for.
fn render_digest(org: &OrgDataStore, now: DateTime<Utc>, tz: Tz, days: i64) -> Option<String> {
    let selected = digest::select_digest(org.events(), now, tz, days);
    if selected.is_empty() {
        return None;
    }
    let mut lines = vec![format!("Daily digest for the next {} day(s):", days)];
    lines.extend(selected.iter().map(|e| e.display_line(tz)));
    Some(lines.join("\n"))
}

fn render_reminder(event: &Event, tz: Tz) -> String {
    let local = event.starts_at.with_timezone(&tz);
    let mut text = format!("Reminder: {} at {}.", event.title, local.format("%H:%M"));
    if let Some(ref description) = event.description {
        text.push_str(&format!(" {}", description));
    }
    text
}

async fn broadcast(outbound: &dyn Outbound, subscribers: &[String], text: &str) {
    for chat_id in subscribers {
        if let Err(e) = outbound.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "failed to deliver scheduled message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::domain::traits::BotInfo;
    use async_trait::async_trait;
    use chrono_tz::America::New_York;
    use chrono_tz::Europe::Moscow;
    use std::sync::Mutex;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().expect("test timestamp")
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).expect("valid time")
    }

    #[test]
    fn fires_today_when_the_hour_is_still_ahead() {
        // 08:00 Moscow.
        let next = next_daily_fire(utc("2026-03-10T05:00:00Z"), Moscow, nine());
        assert_eq!(next, utc("2026-03-10T06:00:00Z"));
    }

    #[test]
    fn fires_tomorrow_once_the_hour_has_passed() {
        // 10:00 Moscow.
        let next = next_daily_fire(utc("2026-03-10T07:00:00Z"), Moscow, nine());
        assert_eq!(next, utc("2026-03-11T06:00:00Z"));
    }

    #[test]
    fn the_firing_instant_itself_rolls_to_the_next_day() {
        let now = utc("2026-03-10T06:00:00Z");
        assert_eq!(next_daily_fire(now, Moscow, nine()), utc("2026-03-11T06:00:00Z"));
    }

    #[test]
    fn dst_gap_skips_to_the_next_day_the_time_exists() {
        // 02:30 does not exist in New York on 8 March 2026; the next
        // firing is 02:30 EDT on the 9th.
        let half_past_two = NaiveTime::from_hms_opt(2, 30, 0).expect("valid time");
        let now = utc("2026-03-08T06:00:00Z"); // 01:00 EST
        let next = next_daily_fire(now, New_York, half_past_two);
        assert_eq!(next, utc("2026-03-09T06:30:00Z"));
    }

    #[test]
    fn reminder_leads_the_event_by_fifteen_minutes() {
        let events = vec![Event::new("standup", utc("2026-03-10T10:00:00Z"))];
        let (at, event) =
            next_reminder(&events, utc("2026-03-10T09:00:00Z")).expect("reminder");
        assert_eq!(at, utc("2026-03-10T09:45:00Z"));
        assert_eq!(event.title, "standup");
    }

    #[test]
    fn past_reminders_are_not_rescheduled() {
        let events = vec![Event::new("standup", utc("2026-03-10T10:00:00Z"))];
        assert!(next_reminder(&events, utc("2026-03-10T09:50:00Z")).is_none());
    }

    #[test]
    fn earliest_reminder_wins() {
        let events = vec![
            Event::new("later", utc("2026-03-10T12:00:00Z")),
            Event::new("sooner", utc("2026-03-10T10:00:00Z")),
        ];
        let (_, event) =
            next_reminder(&events, utc("2026-03-10T08:00:00Z")).expect("reminder");
        assert_eq!(event.title, "sooner");
    }

    /// Fails for one chat id, records deliveries to the rest.
    struct FlakyOutbound {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Outbound for FlakyOutbound {
        async fn send_message(&self, chat_id: &str, _text: &str) -> Result<(), BotError> {
            if chat_id == "down" {
                return Err(BotError::Network("unreachable".to_string()));
            }
            self.sent.lock().expect("lock").push(chat_id.to_string());
            Ok(())
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo {
                id: "test".to_string(),
                name: "test".to_string(),
                username: "test".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn broadcast_continues_past_a_failing_subscriber() {
        let outbound = FlakyOutbound {
            sent: Mutex::new(Vec::new()),
        };
        let subscribers = vec!["down".to_string(), "42".to_string()];
        broadcast(&outbound, &subscribers, "hello").await;
        assert_eq!(*outbound.sent.lock().expect("lock"), vec!["42".to_string()]);
    }
}
