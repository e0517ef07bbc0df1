mod support;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{get, post};
use axum::{Json, Router};
use scape_console::backend::{Backend, BackendError, HttpBackend};
use scape_console::session::{build_run_config, SliderChannel, SliderUpdate, WindowMode};
use support::{serve, Recorded, RequestLog};

async fn recorded(
    State(log): State<RequestLog>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    support::record(&log, &uri, &headers, body);
    StatusCode::OK
}

async fn image(State(log): State<RequestLog>, uri: Uri, headers: HeaderMap) -> Vec<u8> {
    support::record(&log, &uri, &headers, String::new());
    if uri.path().ends_with("originalImage") {
        vec![0x89, b'P', b'N', b'G', 1, 2]
    } else {
        vec![0x89, b'P', b'N', b'G']
    }
}

fn reference_backend(log: RequestLog) -> Router {
    Router::new()
        .route(
            "/api/scripts",
            get(|| async { Json(vec!["alpha.script", "package-info.java", "beta.script"]) }),
        )
        .route("/api/logs", get(|| async { Json(vec!["booting", "ready"]) }))
        .route("/api/progress", get(|| async { Json(42) }))
        .route("/api/isRunning", get(|| async { Json(true) }))
        .route("/api/runConfig", post(recorded))
        .route("/api/stop", post(recorded))
        .route("/api/slider", post(recorded))
        .route("/api/submitColour", post(recorded))
        .route("/api/originalImage", get(image))
        .route("/api/modifiedImage", get(image))
        .with_state(log)
}

async fn start_reference() -> (HttpBackend, RequestLog) {
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let url = serve(reference_backend(log.clone())).await;
    (HttpBackend::new(&url).expect("backend"), log)
}

fn requests(log: &RequestLog) -> Vec<Recorded> {
    log.lock().expect("request log").clone()
}

#[tokio::test]
async fn reads_catalog_and_topic_snapshots() {
    let (backend, _) = start_reference().await;
    assert_eq!(
        backend.list_scripts().await.expect("scripts"),
        vec!["alpha.script", "package-info.java", "beta.script"]
    );
    assert_eq!(
        backend.fetch_logs().await.expect("logs"),
        vec!["booting", "ready"]
    );
    assert_eq!(backend.fetch_progress().await.expect("progress"), 42);
    assert!(backend.fetch_running().await.expect("running"));
}

#[tokio::test]
async fn start_and_stop_use_the_backend_body_shapes() {
    let (backend, log) = start_reference().await;
    let config =
        build_run_config(Some("beta.script"), "15", Some(WindowMode::Resizable)).expect("config");
    backend.start_run(&config).await.expect("start");
    backend.stop_run().await.expect("stop");

    let seen = requests(&log);
    assert_eq!(seen[0].path, "/api/runConfig");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).expect("json body");
    assert_eq!(
        body,
        serde_json::json!({"script": "beta.script", "duration": 15, "fixed": false})
    );
    assert_eq!(seen[1].path, "/api/stop");
    assert_eq!(seen[1].body, "{}");
    assert_eq!(seen[1].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn slider_and_colour_requests() {
    let (backend, log) = start_reference().await;
    backend
        .update_slider(SliderUpdate {
            channel: SliderChannel::ValMin,
            value: 64,
        })
        .await
        .expect("slider");
    backend.submit_colour("teal").await.expect("colour");

    let seen = requests(&log);
    let slider: serde_json::Value = serde_json::from_str(&seen[0].body).expect("json body");
    assert_eq!(
        slider,
        serde_json::json!({"sliderName": "valMin", "sliderValue": 64})
    );
    assert_eq!(seen[1].path, "/api/submitColour");
    assert_eq!(seen[1].body, "teal");
    assert_eq!(seen[1].content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn previews_carry_the_freshness_token() {
    let (backend, log) = start_reference().await;
    let images = backend.fetch_previews(1_700_000_000_123).await.expect("previews");
    assert_eq!(images.original.len(), 6);
    assert_eq!(images.modified.len(), 4);

    let mut seen = requests(&log);
    seen.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].path, "/api/modifiedImage");
    assert_eq!(seen[1].path, "/api/originalImage");
    for request in seen {
        assert_eq!(request.query.as_deref(), Some("t=1700000000123"));
    }
}

#[tokio::test]
async fn non_success_status_and_bad_json_become_errors() {
    let router = Router::new()
        .route(
            "/api/stop",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "not running") }),
        )
        .route("/api/progress", get(|| async { "forty" }));
    let backend = HttpBackend::new(&serve(router).await).expect("backend");

    match backend.stop_run().await {
        Err(BackendError::Status {
            endpoint,
            status,
            body,
        }) => {
            assert_eq!(endpoint, "api/stop");
            assert_eq!(status, 500);
            assert_eq!(body, "not running");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let error = backend.fetch_progress().await.expect_err("malformed");
    assert!(error.is_malformed_payload());
    assert_eq!(error.endpoint(), Some("api/progress"));
}

#[tokio::test]
async fn backend_url_path_prefix_is_preserved() {
    let router = Router::new().route(
        "/scape/api/isRunning",
        get(|| async { Json(false) }),
    );
    let url = format!("{}/scape", serve(router).await);
    let backend = HttpBackend::new(&url).expect("backend");
    assert!(!backend.fetch_running().await.expect("running"));
}
