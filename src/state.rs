//! Shared application state for request handlers.

use std::sync::Arc;

use crate::opens::{OpenRecorder, TracingRecorder};
use crate::pixel::PixelSource;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the pixel source and the recorder every email open is reported to.
#[derive(Clone)]
pub struct AppState {
    pub pixel: Arc<PixelSource>,
    pub opens: Arc<dyn OpenRecorder>,
}

impl AppState {
    /// Creates a new application state that logs opens through tracing.
    pub fn new(pixel: PixelSource) -> Self {
        Self::with_recorder(pixel, Arc::new(TracingRecorder))
    }

    /// Creates a new application state reporting opens to `opens`.
    pub fn with_recorder(pixel: PixelSource, opens: Arc<dyn OpenRecorder>) -> Self {
        Self {
            pixel: Arc::new(pixel),
            opens,
        }
    }
}
