use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::io;

use crate::config::PIXEL_ERROR_BODY;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Pixel asset unavailable: {0}")]
    PixelUnavailable(#[from] io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Surfaced to the client only; the open line is the request's one log entry.
        match self {
            AppError::PixelUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, PIXEL_ERROR_BODY).into_response()
            }
        }
    }
}
