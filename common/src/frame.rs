use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Width in bytes of one packed RGB565 sample.
pub const SAMPLE_WIDTH: usize = 2;

/// One captured image buffer with timestamp metadata.
///
/// The buffer holds packed 16-bit samples in the sensor's native
/// (little-endian) word order. A trailing odd byte is not a sample.
#[derive(Debug, Clone)]
pub struct Frame {
    data: Bytes,
    pub captured_at_ms: i64,
    pub seq: u64,
}

impl Frame {
    pub fn new(data: impl Into<Bytes>, captured_at_ms: i64, seq: u64) -> Self {
        Self {
            data: data.into(),
            captured_at_ms,
            seq,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Cheap handle to the same buffer, usable after the frame is released.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.data.len() / SAMPLE_WIDTH
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.captured_at_ms).unwrap_or_else(Utc::now)
    }

    /// `<secs>.<micros>` capture time, as sent in the `X-Timestamp` header.
    pub fn timestamp_header(&self) -> String {
        let at = self.captured_at();
        format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
    }
}
