//! Org data store - company profile and event list from a JSON document
//!
//! Events are immutable once loaded. Entries with an unparseable timestamp
//! are skipped with a count; a missing document at startup is fatal.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::application::errors::LoadError;
use crate::domain::entities::Event;

#[derive(Debug, Clone, Deserialize)]
pub struct OrgProfile {
    pub company: CompanyInfo,
    #[serde(default)]
    pub contacts: Vec<ContactEntry>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub industry: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct OrgDocument {
    company: CompanyInfo,
    #[serde(default)]
    contacts: Vec<ContactEntry>,
    #[serde(default)]
    team: Vec<TeamMember>,
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    subscribers: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    title: String,
    starts_at: String,
    #[serde(default)]
    description: Option<String>,
}

/// In-memory profile and event snapshot, read-only after load.
pub struct OrgDataStore {
    profile: OrgProfile,
    events: Vec<Event>,
    subscribers: Vec<String>,
    skipped_events: usize,
}

impl OrgDataStore {
    /// Load the document. Naive timestamps are interpreted in `tz`, the
    /// organization's configured zone.
    pub fn load(path: impl Into<PathBuf>, tz: Tz) -> Result<Self, LoadError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| LoadError::Unavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let store = Self::from_json(&content, tz).map_err(|e| match e {
            LoadError::Malformed { reason, .. } => LoadError::Malformed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        if store.skipped_events > 0 {
            tracing::warn!(
                path = %path.display(),
                skipped = store.skipped_events,
                "dropped events with unparseable timestamps"
            );
        }
        tracing::info!(
            path = %path.display(),
            events = store.events.len(),
            "org profile loaded"
        );
        Ok(store)
    }

    pub fn from_json(content: &str, tz: Tz) -> Result<Self, LoadError> {
        let document: OrgDocument =
            serde_json::from_str(content).map_err(|e| LoadError::Malformed {
                path: String::new(),
                reason: e.to_string(),
            })?;

        let mut events = Vec::with_capacity(document.events.len());
        let mut skipped = 0usize;
        for raw in document.events {
            match parse_timestamp(&raw.starts_at, tz) {
                Some(starts_at) => {
                    let mut event = Event::new(raw.title, starts_at);
                    if let Some(description) = raw.description {
                        event = event.with_description(description);
                    }
                    events.push(event);
                }
                None => {
                    tracing::warn!(title = %raw.title, starts_at = %raw.starts_at,
                        "skipping event with unparseable timestamp");
                    skipped += 1;
                }
            }
        }

        Ok(Self {
            profile: OrgProfile {
                company: document.company,
                contacts: document.contacts,
                team: document.team,
            },
            events,
            subscribers: document.subscribers.iter().map(i64::to_string).collect(),
            skipped_events: skipped,
        })
    }

    /// Build a store from already-parsed parts, bypassing file IO.
    pub fn from_parts(profile: OrgProfile, events: Vec<Event>) -> Self {
        Self {
            profile,
            events,
            subscribers: Vec::new(),
            skipped_events: 0,
        }
    }

    pub fn profile(&self) -> &OrgProfile {
        &self.profile
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Chat ids on the scheduled-delivery list.
    pub fn subscribers(&self) -> &[String] {
        &self.subscribers
    }

    pub fn skipped_events(&self) -> usize {
        self.skipped_events
    }
}

/// RFC 3339 with an explicit offset, or a naive `YYYY-MM-DDTHH:MM[:SS]`
/// interpreted in the organizational zone.
fn parse_timestamp(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Moscow;

    const SAMPLE: &str = r#"{
        "company": {"name": "Acme Logistics", "industry": "Freight"},
        "contacts": [{"label": "Reception", "value": "+7 000"}],
        "team": [{"name": "Olga", "role": "COO"}],
        "events": [
            {"title": "Planning", "starts_at": "2026-09-01T10:00:00+03:00", "description": "weekly"},
            {"title": "Naive", "starts_at": "2026-09-02T18:30"},
            {"title": "Broken", "starts_at": "next tuesday"}
        ],
        "subscribers": [111, 222]
    }"#;

    #[test]
    fn loads_profile_and_events() {
        let store = OrgDataStore::from_json(SAMPLE, Moscow).expect("parse");
        assert_eq!(store.profile().company.name, "Acme Logistics");
        assert_eq!(store.profile().team.len(), 1);
        assert_eq!(store.events().len(), 2);
        assert_eq!(store.skipped_events(), 1);
        assert_eq!(store.subscribers(), ["111", "222"]);
    }

    #[test]
    fn naive_timestamps_use_the_org_zone() {
        let store = OrgDataStore::from_json(SAMPLE, Moscow).expect("parse");
        let naive = store
            .events()
            .iter()
            .find(|e| e.title == "Naive")
            .expect("naive event");
        // 18:30 Moscow is 15:30 UTC.
        let expected: DateTime<Utc> = "2026-09-02T15:30:00Z".parse().expect("timestamp");
        assert_eq!(naive.starts_at, expected);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(OrgDataStore::from_json("{not json", Moscow).is_err());
    }
}
