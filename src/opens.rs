//! Recording of email opens.
//!
//! Handlers never write to the global logger directly; they go through an
//! [`OpenRecorder`] held in the application state. The production recorder
//! emits a tracing event, tests swap in a [`MemoryRecorder`].

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::middleware::RequestId;

/// A single pixel fetch attributed to an email identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailOpen {
    /// Value of the `email` query parameter, empty when absent
    pub email: String,
    pub opened_at: DateTime<Utc>,
    /// Request the pixel was served on, when recorded by the tracking route
    pub request_id: Option<RequestId>,
}

impl EmailOpen {
    pub fn new(email: impl Into<String>, opened_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            opened_at,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// An open stamped with the current time.
    pub fn now(email: impl Into<String>) -> Self {
        Self::new(email, Utc::now())
    }

    /// RFC 3339 timestamp with second precision, e.g. `2024-05-01T12:00:00Z`.
    pub fn timestamp(&self) -> String {
        self.opened_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for EmailOpen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email opened by: {} at {}", self.email, self.timestamp())
    }
}

/// Sink for email opens.
pub trait OpenRecorder: Send + Sync {
    fn record(&self, open: &EmailOpen);
}

/// Writes each open as an info-level tracing event.
///
/// The request ID is not repeated in the message; the event is emitted inside
/// the request span, which already carries it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl OpenRecorder for TracingRecorder {
    fn record(&self, open: &EmailOpen) {
        tracing::info!(target: "trackpixel::opens", "{}", open);
    }
}

/// Keeps opens in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    opens: Mutex<Vec<EmailOpen>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn opens(&self) -> Vec<EmailOpen> {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OpenRecorder for MemoryRecorder {
    fn record(&self, open: &EmailOpen) {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(open.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        let open = EmailOpen::new("alice@example.com", at);
        assert_eq!(
            open.to_string(),
            "Email opened by: alice@example.com at 2024-05-01T12:30:45Z"
        );
    }

    #[test]
    fn test_display_empty_email() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let open = EmailOpen::new("", at);
        assert_eq!(open.to_string(), "Email opened by:  at 2024-01-02T03:04:05Z");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let open = EmailOpen::now("bob@example.com");
        let parsed = DateTime::parse_from_rfc3339(&open.timestamp()).unwrap();
        assert_eq!(parsed.timestamp(), open.opened_at.timestamp());
    }

    #[test]
    fn test_memory_recorder_keeps_order() {
        let recorder = MemoryRecorder::new();
        recorder.record(&EmailOpen::now("first"));
        recorder.record(&EmailOpen::now("second"));

        let emails: Vec<_> = recorder.opens().into_iter().map(|o| o.email).collect();
        assert_eq!(emails, ["first", "second"]);
    }

    #[test]
    fn test_request_id_is_not_part_of_the_line() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        let open = EmailOpen::new("dave@example.com", at).with_request_id(RequestId::new());
        assert!(open.request_id.is_some());
        assert_eq!(
            open.to_string(),
            "Email opened by: dave@example.com at 2024-05-01T12:30:45Z"
        );
    }
}
