//! On-disk form of a [`Session`].
//!
//! Current records are a versioned envelope:
//!
//! ```json
//! {"version":1,"user":{"id":"1","email":"a@b.com","name":"John Doe","role":"admin"},
//!  "issuedAt":"2026-01-01T00:00:00Z","expiresAt":null}
//! ```
//!
//! Older installs wrote the bare user object with no envelope. Those still
//! load and are treated as version 0. An empty value is a sign-out tombstone.

use crate::types::Session;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub version: u32,
    pub user: Session,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Why a stored record could not be turned back into a session. Never
/// surfaced to callers; rehydration logs it and settles on signed-out.
#[derive(Debug, Error)]
pub enum RehydrationError {
    #[error("record is not valid json")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u64),
    #[error("record has an empty user id")]
    EmptyUserId,
    #[error("session expired at {0}")]
    Expired(DateTime<Utc>),
}

impl SessionRecord {
    pub fn new(user: Session, issued_at: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        Self {
            version: RECORD_VERSION,
            user,
            issued_at,
            expires_at: ttl.map(|ttl| issued_at + ttl),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// `Ok(None)` for a tombstone, `Ok(Some(_))` for a live session.
    pub fn decode(raw: &str, now: DateTime<Utc>) -> Result<Option<Session>, RehydrationError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(raw)?;
        let session = match value.get("version") {
            Some(version) => {
                let found = version.as_u64().unwrap_or(u64::MAX);
                if found != u64::from(RECORD_VERSION) {
                    return Err(RehydrationError::UnsupportedVersion(found));
                }
                let record: SessionRecord = serde_json::from_value(value)?;
                if let Some(expires_at) = record.expires_at {
                    if expires_at <= now {
                        return Err(RehydrationError::Expired(expires_at));
                    }
                }
                record.user
            }
            None => serde_json::from_value::<Session>(value)?,
        };

        if session.user_id.trim().is_empty() {
            return Err(RehydrationError::EmptyUserId);
        }
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn user() -> Session {
        Session {
            user_id: "1".to_string(),
            email: "a@b.com".to_string(),
            display_name: "John Doe".to_string(),
            role: Role::Admin,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn encoded_record_decodes_to_same_user() {
        let record = SessionRecord::new(user(), at("2026-01-01T00:00:00Z"), None);
        let raw = record.encode().unwrap();
        assert!(raw.contains("\"version\":1"));
        assert!(!raw.contains("expiresAt"));

        let decoded = SessionRecord::decode(&raw, at("2026-06-01T00:00:00Z")).unwrap();
        assert_eq!(decoded, Some(user()));
    }

    #[test]
    fn legacy_bare_user_still_loads() {
        let raw = r#"{"id":"1","email":"a@b.com","name":"John Doe","role":"admin"}"#;
        let decoded = SessionRecord::decode(raw, Utc::now()).unwrap();
        assert_eq!(decoded, Some(user()));
    }

    #[test]
    fn empty_value_is_a_tombstone() {
        assert_eq!(SessionRecord::decode("", Utc::now()).unwrap(), None);
        assert_eq!(SessionRecord::decode("  \n", Utc::now()).unwrap(), None);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = SessionRecord::decode("{not json", Utc::now()).unwrap_err();
        assert!(matches!(err, RehydrationError::Malformed(_)));

        let err = SessionRecord::decode(r#"{"id":"1"}"#, Utc::now()).unwrap_err();
        assert!(matches!(err, RehydrationError::Malformed(_)));
    }

    #[test]
    fn future_version_is_rejected_not_guessed() {
        let raw = r#"{"version":7,"user":{"id":"1","email":"a@b.com","name":"x","role":"viewer"}}"#;
        let err = SessionRecord::decode(raw, Utc::now()).unwrap_err();
        assert!(matches!(err, RehydrationError::UnsupportedVersion(7)));
    }

    #[test]
    fn expired_record_is_rejected() {
        let issued = at("2026-01-01T00:00:00Z");
        let record = SessionRecord::new(user(), issued, Some(Duration::hours(1)));
        let raw = record.encode().unwrap();

        assert!(SessionRecord::decode(&raw, at("2026-01-01T00:30:00Z"))
            .unwrap()
            .is_some());
        let err = SessionRecord::decode(&raw, at("2026-01-01T01:00:00Z")).unwrap_err();
        assert!(matches!(err, RehydrationError::Expired(_)));
    }

    #[test]
    fn empty_user_id_is_rejected() {
        let raw = r#"{"id":" ","email":"a@b.com","name":"x","role":"viewer"}"#;
        let err = SessionRecord::decode(raw, Utc::now()).unwrap_err();
        assert!(matches!(err, RehydrationError::EmptyUserId));
    }
}
