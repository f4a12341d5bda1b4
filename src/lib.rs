//! trackpixel - email open tracking pixel server
//!
//! Serves a 1x1 transparent GIF on `GET /track` and records the `email`
//! query parameter of every fetch, so embedding the pixel in an email
//! reveals when it was opened.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod opens;
pub mod pixel;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
