//! Frame acquisition: sensors that produce raw RGB565 buffers, and a
//! bounded pool that lends each captured frame out for one request.

mod grabber;
pub mod http;
pub mod still;

use bytes::Bytes;
use std::future::Future;
use std::time::Duration;

pub use grabber::{FrameGrabber, FrameGuard};

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("failed to read {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("sensor returned an empty frame")]
    Empty,
}

/// Why no frame could be handed out. Never fatal; the next request tries again.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no free frame buffer")]
    NoFreeBuffer,
    #[error("sensor read timed out after {0:?}")]
    Timeout(Duration),
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
}

/// Source of raw frame buffers.
///
/// Implementations return packed little-endian RGB565 samples; the caller
/// owns stamping and buffer accounting.
pub trait Sensor: Send + Sync + 'static {
    fn read_frame(&self) -> impl Future<Output = Result<Bytes, SensorError>> + Send;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
