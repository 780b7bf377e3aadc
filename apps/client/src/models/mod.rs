//! Wire types exchanged with the backend.

pub mod admin;
pub mod ai;
pub mod documents;
pub mod resume;
pub mod user;

pub use user::{Role, User, UserUpdate};

use serde::Deserialize;

/// `{"message": ...}` acknowledgement returned by deletes, password changes
/// and the admin toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Serde helper for the backend's timestamps, which arrive either as RFC 3339
/// (`2024-05-01T10:00:00Z`) or as naive ISO strings without an offset.
/// Naive values are taken to be UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}
