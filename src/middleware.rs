//! Per-request identifiers.
//!
//! Every request gets a [`RequestId`]. It is stored in the request extensions,
//! where the tracking handler picks it up and attaches it to the
//! [`EmailOpen`](crate::opens::EmailOpen) it records, and it is the main field
//! of the span every log line of the request is emitted in. An open seen in a
//! recorder can therefore be matched to the log lines of the fetch behind it.

use std::fmt;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Identifier of a single HTTP request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// A fresh random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Assigns a [`RequestId`] and runs the rest of the stack inside its span.
///
/// The outcome is logged at debug level, so with the default filter an open
/// produces exactly one line: the one written by the open recorder.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    request.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        path = %request.uri().path(),
    );

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::debug!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Served"
        );
    });

    response
}
