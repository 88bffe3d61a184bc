use bytes::Bytes;
use image::{ImageReader, RgbImage};
use oilcam_detector::Rgb565;
use std::path::Path;
use tracing::info;

use crate::{Sensor, SensorError};

/// Serves the same frame on every read, loaded once from disk.
///
/// `.rgb565` and `.raw` files are taken as already-packed sample buffers;
/// any other file is decoded as an image and packed to RGB565.
pub struct StillImageSensor {
    data: Bytes,
}

impl StillImageSensor {
    pub fn open(path: &Path) -> Result<Self, SensorError> {
        let raw = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("rgb565" | "raw")
        );
        let data = if raw {
            std::fs::read(path).map_err(|e| SensorError::Io(path.display().to_string(), e))?
        } else {
            let img = ImageReader::open(path)
                .map_err(|e| SensorError::Io(path.display().to_string(), e))?
                .with_guessed_format()
                .map_err(|e| SensorError::Io(path.display().to_string(), e))?
                .decode()?;
            pack_rgb565(&img.to_rgb8())
        };
        if data.is_empty() {
            return Err(SensorError::Empty);
        }
        info!(path = %path.display(), bytes = data.len(), raw, "still frame loaded");
        Ok(Self::from_bytes(data))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl Sensor for StillImageSensor {
    async fn read_frame(&self) -> Result<Bytes, SensorError> {
        Ok(self.data.clone())
    }

    fn name(&self) -> &str {
        "still"
    }
}

/// Pack an 8-bit RGB image row-major into little-endian RGB565 samples.
pub fn pack_rgb565(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(img.pixels().len() * 2);
    for pixel in img.pixels() {
        let [r, g, b] = pixel.0;
        buf.extend_from_slice(&Rgb565::from_rgb(r, g, b).to_le_bytes());
    }
    buf
}
