//! The tracking pixel handler.
//!
//! Records who opened the email, then returns the GIF. The open is recorded
//! before the asset is read, so a broken asset still leaves a trace of the open.

use axum::{
    extract::{RawQuery, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Response},
    Extension,
};
use tracing::instrument;

use crate::config::{EMAIL_QUERY_PARAM, PIXEL_CONTENT_TYPE};
use crate::error::AppError;
use crate::middleware::RequestId;
use crate::opens::EmailOpen;
use crate::state::AppState;

/// Tracking pixel handler for `GET /track?email=...`.
#[instrument(name = "track::pixel", skip_all)]
pub async fn pixel(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let email = email_from_query(query.as_deref());
    state
        .opens
        .record(&EmailOpen::now(email).with_request_id(request_id));

    let bytes = state.pixel.load().await?;
    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(PIXEL_CONTENT_TYPE)),
        (CONTENT_LENGTH, HeaderValue::from(bytes.len())),
    ];

    Ok((headers, bytes).into_response())
}

/// Extract the `email` parameter from a raw query string.
///
/// The first occurrence wins. Missing parameters and missing query strings
/// both yield an empty string; malformed escapes are kept verbatim.
pub fn email_from_query(query: Option<&str>) -> String {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key) == EMAIL_QUERY_PARAM).then_some(value)
        })
        .map(decode_component)
        .unwrap_or_default()
}

/// Decode one `application/x-www-form-urlencoded` component.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
