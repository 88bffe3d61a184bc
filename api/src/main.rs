mod routes;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use oilcam_capture::http::HttpSnapshotSensor;
use oilcam_capture::still::StillImageSensor;
use oilcam_capture::{FrameGrabber, Sensor};
use oilcam_common::config::Config;
use oilcam_detector::Classifier;
use routes::AppState;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        port = config.server.port,
        source = config.camera.source,
        frame_buffers = config.camera.frame_buffers,
        "starting oilcam"
    );

    let timeout = Duration::from_millis(config.camera.capture_timeout_ms);
    match config.camera.source.as_str() {
        "still" => {
            let path = PathBuf::from(config.camera.path.clone().unwrap_or_default());
            match StillImageSensor::open(&path) {
                Ok(sensor) => serve(&config, sensor, timeout).await,
                Err(e) => {
                    error!(error = %e, "failed to load still frame");
                    std::process::exit(1);
                }
            }
        }
        "http" => {
            let url = config.camera.url.clone().unwrap_or_default();
            match HttpSnapshotSensor::new(&url, timeout) {
                Ok(sensor) => {
                    info!(url = sensor.url(), "using upstream snapshot camera");
                    serve(&config, sensor, timeout).await
                }
                Err(e) => {
                    error!(error = %e, "failed to create HTTP camera client");
                    std::process::exit(1);
                }
            }
        }
        other => {
            error!(source = other, "unknown camera source, expected 'still' or 'http'");
            std::process::exit(1);
        }
    }
}

async fn serve<S: Sensor>(config: &Config, sensor: S, timeout: Duration) {
    let grabber = FrameGrabber::new(sensor, config.camera.frame_buffers, timeout);
    let state = AppState::new(grabber);
    warn_unreachable_colors(&state.classifier);
    let app = routes::router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", config.server.port);
    info!(addr, "oilcam HTTP server starting");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        eprintln!("Failed to bind to {addr}: {e}");
        std::process::exit(1);
    });
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Palette colours with low bits set can never equal a widened sample.
fn warn_unreachable_colors(classifier: &Classifier) {
    for palette in [classifier.good_palette(), classifier.bad_palette()] {
        let unreachable = palette.unreachable();
        if unreachable.is_empty() {
            continue;
        }
        let colors: Vec<String> = unreachable.iter().map(ToString::to_string).collect();
        warn!(
            palette = palette.name(),
            unreachable = unreachable.len(),
            total = palette.len(),
            colors = colors.join(" "),
            "palette colours no RGB565 sample can match"
        );
    }
}
