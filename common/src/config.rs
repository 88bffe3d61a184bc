use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub camera: CameraConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    /// Frame source: "still" (image file) or "http" (upstream snapshot URL).
    #[serde(default = "default_source")]
    pub source: String,
    pub path: Option<String>,
    pub url: Option<String>,
    /// Number of frame buffers that may be borrowed at once.
    #[serde(default = "default_frame_buffers")]
    pub frame_buffers: usize,
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), source = config.camera.source, "config loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would leave the server unable to capture.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.frame_buffers == 0 {
            return Err(ConfigError::Invalid(
                "camera.frame_buffers must be at least 1".into(),
            ));
        }
        match self.camera.source.as_str() {
            "still" if self.camera.path.is_none() => Err(ConfigError::Invalid(
                "camera.path is required when camera.source = \"still\"".into(),
            )),
            "http" if self.camera.url.is_none() => Err(ConfigError::Invalid(
                "camera.url is required when camera.source = \"http\"".into(),
            )),
            "still" | "http" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "unknown camera.source '{other}', expected 'still' or 'http'"
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_port() -> u16 {
    80
}
fn default_source() -> String {
    "still".into()
}
fn default_frame_buffers() -> usize {
    2
}
fn default_capture_timeout_ms() -> u64 {
    3000
}
fn default_log_level() -> String {
    "info".into()
}
