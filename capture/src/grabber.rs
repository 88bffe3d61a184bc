use chrono::Utc;
use oilcam_common::frame::Frame;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace, warn};

use crate::{CaptureError, Sensor};

/// Lends out captured frames from a fixed number of buffers.
///
/// Each [`FrameGuard`] holds one buffer until it is dropped, so a frame is
/// returned exactly once on every path, including early error returns.
pub struct FrameGrabber<S> {
    sensor: S,
    buffers: Arc<Semaphore>,
    capacity: usize,
    timeout: Duration,
    seq: AtomicU64,
}

/// A borrowed frame. Dropping it releases the buffer.
#[derive(Debug)]
pub struct FrameGuard {
    frame: Frame,
    _permit: OwnedSemaphorePermit,
}

impl<S: Sensor> FrameGrabber<S> {
    pub fn new(sensor: S, frame_buffers: usize, timeout: Duration) -> Self {
        Self {
            sensor,
            buffers: Arc::new(Semaphore::new(frame_buffers)),
            capacity: frame_buffers,
            timeout,
            seq: AtomicU64::new(0),
        }
    }

    /// Capture one frame into a free buffer.
    ///
    /// Fails immediately when every buffer is lent out; does not wait.
    pub async fn acquire(&self) -> Result<FrameGuard, CaptureError> {
        let permit = Arc::clone(&self.buffers)
            .try_acquire_owned()
            .map_err(|_| CaptureError::NoFreeBuffer)?;

        let data = match tokio::time::timeout(self.timeout, self.sensor.read_frame()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(sensor = self.sensor.name(), timeout = ?self.timeout, "sensor read timed out");
                return Err(CaptureError::Timeout(self.timeout));
            }
        };

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let frame = Frame::new(data, Utc::now().timestamp_millis(), seq);
        debug!(
            sensor = self.sensor.name(),
            seq,
            bytes = frame.len(),
            free = self.buffers.available_permits(),
            "frame acquired"
        );
        Ok(FrameGuard {
            frame,
            _permit: permit,
        })
    }

    /// Buffers not currently lent out.
    pub fn available(&self) -> usize {
        self.buffers.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }
}

impl FrameGuard {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Return the buffer now rather than at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for FrameGuard {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        trace!(seq = self.frame.seq, "frame released");
    }
}
