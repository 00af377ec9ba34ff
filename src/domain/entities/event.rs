use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// An organizational event or announcement. Immutable once loaded.
///
/// The timestamp is stored as an instant; all rendering and window
/// computation converts it into the organization's configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl Event {
    pub fn new(title: impl Into<String>, starts_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            starts_at,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// One-line rendering in the given zone, e.g.
    /// `- Mon 01 Sep 10:00: Team sync — weekly planning`.
    pub fn display_line(&self, tz: Tz) -> String {
        let local = self.starts_at.with_timezone(&tz);
        let mut line = format!("- {}: {}", local.format("%a %d %b %H:%M"), self.title);
        if let Some(ref description) = self.description {
            line.push_str(&format!(" — {}", description));
        }
        line
    }
}
