mod http;

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use reqwest::Url;

use crate::session::{PreviewImages, RunConfig, SliderUpdate};
use crate::sync::Topic;

pub use http::HttpBackend;

/// Every operation the automation backend exposes to the console. Topic
/// polling goes through the same seam as the lifecycle requests so both
/// transports and the orchestrator can run against an in-memory fake.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_scripts(&self) -> Result<Vec<String>, BackendError>;
    async fn start_run(&self, config: &RunConfig) -> Result<(), BackendError>;
    async fn stop_run(&self) -> Result<(), BackendError>;
    async fn fetch_logs(&self) -> Result<Vec<String>, BackendError>;
    async fn fetch_progress(&self) -> Result<i64, BackendError>;
    async fn fetch_running(&self) -> Result<bool, BackendError>;
    async fn update_slider(&self, update: SliderUpdate) -> Result<(), BackendError>;
    async fn fetch_previews(&self, token: u64) -> Result<PreviewImages, BackendError>;
    async fn submit_colour(&self, name: &str) -> Result<(), BackendError>;
}

#[derive(Debug)]
pub enum BackendError {
    InvalidUrl {
        url: String,
        detail: String,
    },
    Http {
        endpoint: &'static str,
        error: reqwest::Error,
    },
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    Decode {
        endpoint: &'static str,
        detail: String,
    },
}

impl BackendError {
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            BackendError::InvalidUrl { .. } => None,
            BackendError::Http { endpoint, .. }
            | BackendError::Status { endpoint, .. }
            | BackendError::Decode { endpoint, .. } => Some(endpoint),
        }
    }

    /// Payload problems are dropped per message; everything else is a
    /// reachability problem.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, BackendError::Decode { .. })
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::InvalidUrl { url, detail } => {
                write!(f, "invalid backend url `{url}`: {detail}")
            }
            BackendError::Http { endpoint, error } => {
                write!(f, "request to {endpoint} failed: {error}")
            }
            BackendError::Status {
                endpoint,
                status,
                body,
            } => {
                if body.trim().is_empty() {
                    write!(f, "{endpoint} returned HTTP {status}")
                } else {
                    write!(f, "{endpoint} returned HTTP {status}: {}", body.trim())
                }
            }
            BackendError::Decode { endpoint, detail } => {
                write!(f, "malformed response from {endpoint}: {detail}")
            }
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Http { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StartRunRequest {
    pub script: String,
    pub duration: u32,
    pub fixed: bool,
}

impl From<&RunConfig> for StartRunRequest {
    fn from(config: &RunConfig) -> Self {
        Self {
            script: config.script_id().to_owned(),
            duration: config.duration_minutes(),
            fixed: config.window_mode().is_fixed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderRequest {
    pub slider_name: &'static str,
    pub slider_value: u16,
}

impl From<SliderUpdate> for SliderRequest {
    fn from(update: SliderUpdate) -> Self {
        Self {
            slider_name: update.channel.id(),
            slider_value: update.value,
        }
    }
}

/// Normalizes the configured backend address into a base that relative
/// endpoint paths can be joined onto.
pub fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|error| BackendError::InvalidUrl {
        url: trimmed.to_owned(),
        detail: error.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BackendError::InvalidUrl {
            url: trimmed.to_owned(),
            detail: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Websocket address of a push topic, derived from the HTTP base.
pub fn push_url(base: &Url, topic: Topic) -> Result<Url, BackendError> {
    let mut url = base.join(topic.push_path()).map_err(|error| BackendError::InvalidUrl {
        url: base.to_string(),
        detail: error.to_string(),
    })?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).map_err(|()| BackendError::InvalidUrl {
        url: base.to_string(),
        detail: format!("cannot derive {scheme} address"),
    })?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{build_run_config, SliderChannel, WindowMode};

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = parse_base_url(" http://10.0.0.2:8080 ").expect("parse");
        assert_eq!(url.as_str(), "http://10.0.0.2:8080/");
        let nested = parse_base_url("http://host/console").expect("parse");
        assert_eq!(
            nested.join("api/scripts").expect("join").as_str(),
            "http://host/console/api/scripts"
        );
    }

    #[test]
    fn base_url_rejects_foreign_schemes() {
        let err = parse_base_url("ftp://host").expect_err("scheme");
        assert!(err.to_string().contains("unsupported scheme `ftp`"));
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn push_url_follows_http_scheme() {
        let plain = parse_base_url("http://host:8080").expect("parse");
        assert_eq!(
            push_url(&plain, Topic::Logs).expect("ws").as_str(),
            "ws://host:8080/ws/logs"
        );
        let secure = parse_base_url("https://host").expect("parse");
        assert_eq!(
            push_url(&secure, Topic::State).expect("wss").as_str(),
            "wss://host/ws/state"
        );
    }

    #[test]
    fn start_request_uses_backend_field_names() {
        let config = build_run_config(Some("beta.script"), "10", Some(WindowMode::Fixed))
            .expect("valid config");
        let body = serde_json::to_value(StartRunRequest::from(&config)).expect("json");
        assert_eq!(
            body,
            serde_json::json!({"script": "beta.script", "duration": 10, "fixed": true})
        );
    }

    #[test]
    fn slider_request_is_camel_case() {
        let body = serde_json::to_value(SliderRequest::from(SliderUpdate {
            channel: SliderChannel::HueMin,
            value: 30,
        }))
        .expect("json");
        assert_eq!(
            body,
            serde_json::json!({"sliderName": "hueMin", "sliderValue": 30})
        );
    }
}
