use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Sensor, SensorError};

/// Pulls one raw frame per read from an upstream snapshot endpoint.
///
/// The endpoint must answer each GET with a single RGB565 buffer.
pub struct HttpSnapshotSensor {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSensor {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SensorError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Sensor for HttpSnapshotSensor {
    async fn read_frame(&self) -> Result<Bytes, SensorError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), url = self.url, "non-success response from camera");
            return Err(SensorError::HttpStatus(response.status().as_u16()));
        }
        let data = response.bytes().await?;
        if data.is_empty() {
            return Err(SensorError::Empty);
        }
        debug!(bytes = data.len(), "snapshot fetched");
        Ok(data)
    }

    fn name(&self) -> &str {
        "http"
    }
}
