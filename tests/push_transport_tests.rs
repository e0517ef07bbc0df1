mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use scape_console::backend::{Backend, HttpBackend};
use scape_console::config::{ConsoleConfig, TransportMode};
use scape_console::sync::{ConnectionManager, FeedEvent, Topic, TopicUpdate};
use support::{next_event, serve};

async fn logs_socket(ws: WebSocketUpgrade, State(connections): State<Arc<AtomicUsize>>) -> Response {
    let attempt = connections.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| stream_logs(socket, attempt))
}

async fn stream_logs(mut socket: WebSocket, attempt: usize) {
    if attempt == 0 {
        let _ = socket.send(Message::Text("line one\r\n".into())).await;
        let _ = socket.send(Message::Binary(vec![1, 2, 3].into())).await;
        let _ = socket.send(Message::Text("line two".into())).await;
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    let _ = socket.send(Message::Text("after reconnect".into())).await;
    while let Some(Ok(_)) = socket.recv().await {}
}

async fn state_socket(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        let _ = socket.send(Message::Text("maybe".into())).await;
        let _ = socket.send(Message::Text(" true \n".into())).await;
        let _ = socket.send(Message::Text("42".into())).await;
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn progress_socket(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        let _ = socket.send(Message::Text("12.5".into())).await;
        let _ = socket.send(Message::Text(" 64\n".into())).await;
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn start_server() -> (String, Arc<AtomicUsize>) {
    let connections = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/ws/logs", get(logs_socket))
        .route("/ws/state", get(state_socket))
        .route("/ws/progress", get(progress_socket))
        .with_state(connections.clone());
    (serve(router).await, connections)
}

fn push_config(url: &str) -> ConsoleConfig {
    ConsoleConfig {
        backend_url: url.to_owned(),
        transport: TransportMode::Push,
        reconnect_delay: Duration::from_millis(50),
        ..ConsoleConfig::default()
    }
}

fn backend(url: &str) -> Arc<dyn Backend> {
    Arc::new(HttpBackend::new(url).expect("backend"))
}

#[tokio::test]
async fn log_channel_reconnects_after_server_close() {
    let (url, connections) = start_server().await;
    let config = push_config(&url);
    let (mut manager, mut feed) =
        ConnectionManager::start_topics(&config, backend(&url), &[Topic::Logs]).expect("start");

    let expected = [
        FeedEvent::Connected(Topic::Logs),
        FeedEvent::Update(Topic::Logs, TopicUpdate::LogLine("line one".to_owned())),
        FeedEvent::Update(Topic::Logs, TopicUpdate::LogLine("line two".to_owned())),
        FeedEvent::Disconnected(Topic::Logs),
        FeedEvent::Connected(Topic::Logs),
        FeedEvent::Update(
            Topic::Logs,
            TopicUpdate::LogLine("after reconnect".to_owned()),
        ),
    ];
    for want in expected {
        assert_eq!(next_event(&mut feed).await, want);
    }
    assert_eq!(connections.load(Ordering::SeqCst), 2);
    manager.shutdown();
}

#[tokio::test]
async fn malformed_state_and_progress_frames_are_dropped() {
    let (url, _) = start_server().await;
    let config = push_config(&url);
    let (mut manager, mut feed) =
        ConnectionManager::start_topics(&config, backend(&url), &[Topic::State, Topic::Progress])
            .expect("start");

    let mut state = Vec::new();
    let mut progress = Vec::new();
    while state.len() < 2 || progress.len() < 2 {
        match next_event(&mut feed).await {
            FeedEvent::Connected(topic) => {
                let seen = if topic == Topic::State {
                    &mut state
                } else {
                    &mut progress
                };
                seen.push(None);
            }
            FeedEvent::Update(Topic::State, update) => state.push(Some(update)),
            FeedEvent::Update(Topic::Progress, update) => progress.push(Some(update)),
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(state, vec![None, Some(TopicUpdate::Running(true))]);
    assert_eq!(progress, vec![None, Some(TopicUpdate::Progress(64))]);
    manager.shutdown();
}

#[tokio::test]
async fn unreachable_backend_keeps_retrying_without_events() {
    let config = push_config("http://127.0.0.1:9");
    let (mut manager, mut feed) = ConnectionManager::start_topics(
        &config,
        backend("http://127.0.0.1:9"),
        &[Topic::Logs],
    )
    .expect("start");
    let outcome = tokio::time::timeout(Duration::from_millis(300), feed.next()).await;
    assert!(outcome.is_err(), "no event expected, got {outcome:?}");
    manager.shutdown();
}
