use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use oilcam_capture::{CaptureError, FrameGrabber, FrameGuard, Sensor};
use oilcam_detector::{Classifier, ModeRegister};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../static/index.html");
const SECRET_HTML: &str = include_str!("../static/secret.html");

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub struct AppState<S> {
    pub classifier: Classifier,
    pub mode: ModeRegister,
    pub grabber: FrameGrabber<S>,
}

impl<S: Sensor> AppState<S> {
    /// Built-in palettes, both categories enabled.
    pub fn new(grabber: FrameGrabber<S>) -> Self {
        Self {
            classifier: Classifier::default(),
            mode: ModeRegister::default(),
            grabber,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET / — live view page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /secret — detection mode controls
async fn secret() -> Html<&'static str> {
    Html(SECRET_HTML)
}

/// GET /setoil?oil=good|bad|<anything else>
///
/// Without `oil` the mode is left alone; a repeated `oil` uses the first.
/// Always answers `OK`.
async fn set_oil<S: Sensor>(
    State(state): State<Arc<AppState<S>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    if let Some(selector) = first_value(pairs, "oil") {
        let mode = state.mode.apply_selector(&selector);
        info!(
            selector,
            good = mode.good_enabled(),
            bad = mode.bad_enabled(),
            "detection mode set"
        );
    }
    (StatusCode::OK, "OK")
}

/// GET /detect — capture one frame and count palette matches
async fn detect<S: Sensor>(State(state): State<Arc<AppState<S>>>) -> Response {
    let guard = match acquire(&state.grabber).await {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let scan_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        let result = scan_state
            .classifier
            .scan_frame(guard.frame(), &scan_state.mode);
        guard.release();
        result
    })
    .await;

    match result {
        Ok(counts) => Json(counts).into_response(),
        Err(e) => {
            error!(error = %e, "spawn_blocking failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /stream — the raw bytes of one captured frame
async fn stream<S: Sensor>(State(state): State<Arc<AppState<S>>>) -> Response {
    let guard = match acquire(&state.grabber).await {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let timestamp = guard.timestamp_header();
    let body = guard.bytes();
    guard.release();

    (
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=capture.jpg".to_string(),
            ),
            (HeaderName::from_static("x-timestamp"), timestamp),
        ],
        body,
    )
        .into_response()
}

fn first_value(pairs: Vec<(String, String)>, key: &str) -> Option<String> {
    pairs.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Borrow a frame, mapping capture failure to a 500.
async fn acquire<S: Sensor>(grabber: &FrameGrabber<S>) -> Result<FrameGuard, Response> {
    grabber.acquire().await.map_err(|e: CaptureError| {
        error!(error = %e, sensor = grabber.sensor().name(), "camera capture failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router<S: Sensor>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/secret", get(secret))
        .route("/setoil", get(set_oil::<S>))
        .route("/detect", get(detect::<S>))
        .route("/stream", get(stream::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bytes::Bytes;
    use oilcam_capture::SensorError;
    use oilcam_detector::{DetectionMode, Palette, Rgb565};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const GOOD: Rgb565 = Rgb565(0xC6CC);
    const BAD: Rgb565 = Rgb565(0x5A6B);

    /// Returns `frame` on every read, or fails when it is `None`.
    struct TestSensor {
        frame: Option<Vec<u8>>,
        reads: AtomicUsize,
    }

    impl Sensor for TestSensor {
        async fn read_frame(&self) -> Result<Bytes, SensorError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.frame.clone().map(Bytes::from).ok_or(SensorError::Empty)
        }
    }

    fn state_with(frame: Option<Vec<u8>>) -> Arc<AppState<TestSensor>> {
        let sensor = TestSensor {
            frame,
            reads: AtomicUsize::new(0),
        };
        let mut state = AppState::new(FrameGrabber::new(sensor, 2, Duration::from_secs(1)));
        state.classifier = Classifier::new(
            Palette::good_oil(),
            Palette::new("bad", [BAD.quantize()]),
        );
        Arc::new(state)
    }

    fn four_sample_frame() -> Vec<u8> {
        [GOOD, BAD, Rgb565(0), GOOD]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect()
    }

    async fn body_bytes(resp: Response) -> Bytes {
        to_bytes(resp.into_body(), usize::MAX).await.unwrap()
    }

    async fn detect_json(state: &Arc<AppState<TestSensor>>) -> serde_json::Value {
        let resp = detect(State(Arc::clone(state))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    async fn set(state: &Arc<AppState<TestSensor>>, oil: Option<&str>) -> Response {
        let pairs = oil
            .map(|v| vec![("oil".to_string(), v.to_string())])
            .unwrap_or_default();
        set_oil(State(Arc::clone(state)), Query(pairs)).await.into_response()
    }

    #[tokio::test]
    async fn detect_counts_with_default_mode() {
        let state = state_with(Some(four_sample_frame()));
        let json = detect_json(&state).await;
        assert_eq!(json, serde_json::json!({"good_oil": 2, "bad_oil": 1}));
        assert_eq!(state.grabber.available(), state.grabber.capacity());
    }

    #[tokio::test]
    async fn detect_after_selecting_bad() {
        let state = state_with(Some(four_sample_frame()));
        let resp = set(&state, Some("bad")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body_bytes(resp).await[..], b"OK");
        let json = detect_json(&state).await;
        assert_eq!(json, serde_json::json!({"good_oil": 0, "bad_oil": 1}));
    }

    #[tokio::test]
    async fn garbage_selector_disables_detection_and_still_ok() {
        let state = state_with(Some(four_sample_frame()));
        let resp = set(&state, Some("garbage")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.mode.get(), DetectionMode::Disabled);
        let json = detect_json(&state).await;
        assert_eq!(json, serde_json::json!({"good_oil": 0, "bad_oil": 0}));
    }

    #[tokio::test]
    async fn missing_selector_leaves_mode_unchanged() {
        let state = state_with(Some(four_sample_frame()));
        set(&state, Some("good")).await;
        let resp = set(&state, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.mode.get(), DetectionMode::GoodOnly);
    }

    #[tokio::test]
    async fn detect_capture_failure_is_server_error() {
        let state = state_with(None);
        let resp = detect(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.grabber.sensor().reads.load(Ordering::SeqCst), 1);
        assert_eq!(state.grabber.available(), state.grabber.capacity());
    }

    #[tokio::test]
    async fn exhausted_buffers_fail_without_reading_sensor() {
        let state = state_with(Some(four_sample_frame()));
        let a = state.grabber.acquire().await.unwrap();
        let b = state.grabber.acquire().await.unwrap();
        let reads_before = state.grabber.sensor().reads.load(Ordering::SeqCst);

        let resp = detect(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = stream(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.grabber.sensor().reads.load(Ordering::SeqCst), reads_before);

        drop((a, b));
        assert_eq!(state.grabber.available(), 2);
    }

    #[tokio::test]
    async fn stream_sends_frame_bytes_as_image() {
        let frame = four_sample_frame();
        let state = state_with(Some(frame.clone()));
        let resp = stream(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=capture.jpg"
        );
        assert!(resp.headers().contains_key("x-timestamp"));
        assert_eq!(state.grabber.available(), 2);
        assert_eq!(&body_bytes(resp).await[..], &frame[..]);
    }

    #[tokio::test]
    async fn stream_capture_failure_is_server_error() {
        let state = state_with(None);
        let resp = stream(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.grabber.available(), 2);
    }

    #[tokio::test]
    async fn static_pages_are_html() {
        let resp = index().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(std::str::from_utf8(&body_bytes(resp).await)
            .unwrap()
            .contains("/detect"));

        let resp = secret().await.into_response();
        assert!(std::str::from_utf8(&body_bytes(resp).await)
            .unwrap()
            .contains("/setoil?oil="));
    }

    async fn get_via_router(state: &Arc<AppState<TestSensor>>, uri: &str) -> Response {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        router(Arc::clone(state)).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn router_serves_pages_and_frames() {
        let state = state_with(Some(four_sample_frame()));
        for uri in ["/", "/secret"] {
            let resp = get_via_router(&state, uri).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            assert!(resp.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html"));
        }

        let resp = get_via_router(&state, "/detect").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(json, serde_json::json!({"good_oil": 2, "bad_oil": 1}));

        let resp = get_via_router(&state, "/stream").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(&body_bytes(resp).await[..], &four_sample_frame()[..]);
        assert_eq!(state.grabber.available(), 2);
    }

    #[tokio::test]
    async fn router_capture_failure_is_server_error() {
        let state = state_with(None);
        for uri in ["/detect", "/stream"] {
            let resp = get_via_router(&state, uri).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        }
        assert_eq!(state.grabber.available(), 2);
    }

    #[tokio::test]
    async fn router_setoil_always_ok() {
        let cases = [
            ("/setoil?oil=good", DetectionMode::GoodOnly),
            ("/setoil?oil=bad", DetectionMode::BadOnly),
            ("/setoil?oil=", DetectionMode::Disabled),
            ("/setoil?oil", DetectionMode::Disabled),
            ("/setoil?oil=%FF", DetectionMode::Disabled),
            ("/setoil?oil=good&oil=bad", DetectionMode::GoodOnly),
        ];
        for (uri, expected) in cases {
            let state = state_with(Some(four_sample_frame()));
            let resp = get_via_router(&state, uri).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            assert_eq!(&body_bytes(resp).await[..], b"OK", "{uri}");
            assert_eq!(state.mode.get(), expected, "{uri}");
        }
    }

    #[tokio::test]
    async fn router_setoil_without_oil_key_keeps_mode() {
        let state = state_with(Some(four_sample_frame()));
        get_via_router(&state, "/setoil?oil=bad").await;
        for uri in ["/setoil", "/setoil?foo=1", "/setoil?foo=good&bar"] {
            let resp = get_via_router(&state, uri).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            assert_eq!(state.mode.get(), DetectionMode::BadOnly, "{uri}");
        }
    }
}
