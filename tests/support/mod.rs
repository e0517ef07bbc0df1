#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, HeaderMap, Uri};
use axum::Router;
use scape_console::sync::{FeedEvent, TopicFeed};
use tokio::net::TcpListener;

/// One request as the fake backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub type RequestLog = Arc<Mutex<Vec<Recorded>>>;

pub fn record(log: &RequestLog, uri: &Uri, headers: &HeaderMap, body: String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    log.lock().expect("request log").push(Recorded {
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        content_type,
        body,
    });
}

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Next feed event, failing the test if none arrives in time.
pub async fn next_event(feed: &mut TopicFeed) -> FeedEvent {
    tokio::time::timeout(Duration::from_secs(5), feed.next())
        .await
        .expect("feed event before timeout")
        .expect("feed still open")
}
