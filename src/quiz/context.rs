//! Inputs of a submission that do not come from the questionnaire fields

use crate::platform;
use chrono::{DateTime, SecondsFormat, Utc};

/// Parsed launch query string (`?token=...&stub=1`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Opaque pass-through token, empty when absent
    pub fn token(&self) -> &str {
        self.get("token").unwrap_or("")
    }

    /// `stub=1` turns on test mode
    pub fn is_stub_mode(&self) -> bool {
        self.get("stub") == Some("1")
    }
}

/// Everything the payload assembler needs besides the fields and branch
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub submitted_at: DateTime<Utc>,
    pub time_zone: String,
    pub query: QueryParams,
    pub user_agent: String,
    /// Random suffix of the response id
    pub nonce: String,
    pub form_id: Option<String>,
}

impl SubmissionContext {
    /// Capture the environment at the moment of submission
    pub fn capture(query: QueryParams, form_id: Option<String>) -> Self {
        let nonce = uuid::Uuid::new_v4().simple().to_string()[..5].to_string();
        Self {
            submitted_at: Utc::now(),
            time_zone: platform::time_zone(),
            query,
            user_agent: platform::user_agent(),
            nonce,
            form_id,
        }
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix
    pub fn timestamp(&self) -> String {
        self.submitted_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_reads_token_and_stub() {
        let query = QueryParams::parse("?token=abc%20123&stub=1");
        assert_eq!(query.token(), "abc 123");
        assert!(query.is_stub_mode());
    }

    #[test]
    fn test_missing_token_is_empty() {
        let query = QueryParams::parse("");
        assert_eq!(query.token(), "");
        assert!(!query.is_stub_mode());
    }

    #[test]
    fn test_stub_requires_one() {
        assert!(!QueryParams::parse("stub=true").is_stub_mode());
    }

    #[test]
    fn test_first_value_wins() {
        let query = QueryParams::parse("token=a&token=b");
        assert_eq!(query.get("token"), Some("a"));
    }

    #[test]
    fn test_capture_nonce_is_short() {
        let ctx = SubmissionContext::capture(QueryParams::default(), None);
        assert_eq!(ctx.nonce.len(), 5);
        assert!(!ctx.user_agent.is_empty());
    }

    #[test]
    fn test_timestamp_matches_iso_shape() {
        let ctx = SubmissionContext {
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            time_zone: "UTC".into(),
            query: QueryParams::default(),
            user_agent: String::new(),
            nonce: "abcde".into(),
            form_id: None,
        };
        assert_eq!(ctx.timestamp(), "2024-05-01T12:30:00.000Z");
    }
}
