//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;

use trackpixel::config::DEFAULT_LOG_FILTER;

/// The 43-byte transparent GIF shipped with the server
pub const GIF: &[u8] = include_bytes!("../../transparent.gif");

/// Log output captured from a thread-local fmt subscriber.
///
/// Uses the server's default filter, so the captured lines are exactly what
/// an operator would see without `RUST_LOG` or `--log-level`.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Capture everything logged on this thread until the guard is dropped.
    ///
    /// `#[tokio::test]` runs on a current-thread runtime, so spawned tasks
    /// log through the guard as well.
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(DEFAULT_LOG_FILTER)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
