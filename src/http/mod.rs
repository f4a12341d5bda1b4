//! HTTP server module.
//!
//! Binds the listening socket, serves the router, and stops accepting
//! connections on SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{bind, serve, start_server, ServerError};
