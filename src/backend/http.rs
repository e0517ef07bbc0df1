use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{parse_base_url, Backend, BackendError, SliderRequest, StartRunRequest};
use crate::session::{PreviewImages, RunConfig, SliderUpdate};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const SCRIPTS: &str = "api/scripts";
const RUN_CONFIG: &str = "api/runConfig";
const STOP: &str = "api/stop";
const LOGS: &str = "api/logs";
const PROGRESS: &str = "api/progress";
const IS_RUNNING: &str = "api/isRunning";
const SLIDER: &str = "api/slider";
const ORIGINAL_IMAGE: &str = "api/originalImage";
const MODIFIED_IMAGE: &str = "api/modifiedImage";
const SUBMIT_COLOUR: &str = "api/submitColour";

/// [`Backend`] over the reference REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| BackendError::Http {
                endpoint: "client",
                error,
            })?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, BackendError> {
        self.base.join(path).map_err(|error| BackendError::InvalidUrl {
            url: format!("{}{path}", self.base),
            detail: error.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, BackendError> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(|error| BackendError::Http {
                endpoint: path,
                error,
            })?;
        let body = checked(path, response)
            .await?
            .bytes()
            .await
            .map_err(|error| BackendError::Http {
                endpoint: path,
                error,
            })?;
        serde_json::from_slice(&body).map_err(|error| BackendError::Decode {
            endpoint: path,
            detail: error.to_string(),
        })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &'static str,
        body: &B,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(|error| BackendError::Http {
                endpoint: path,
                error,
            })?;
        checked(path, response).await.map(drop)
    }

    async fn get_image(&self, path: &'static str, token: u64) -> Result<Vec<u8>, BackendError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("t", &token.to_string());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| BackendError::Http {
                endpoint: path,
                error,
            })?;
        let bytes = checked(path, response)
            .await?
            .bytes()
            .await
            .map_err(|error| BackendError::Http {
                endpoint: path,
                error,
            })?;
        Ok(bytes.to_vec())
    }
}

async fn checked(endpoint: &'static str, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        endpoint,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_scripts(&self) -> Result<Vec<String>, BackendError> {
        self.get_json(SCRIPTS).await
    }

    async fn start_run(&self, config: &RunConfig) -> Result<(), BackendError> {
        self.post_json(RUN_CONFIG, &StartRunRequest::from(config))
            .await
    }

    async fn stop_run(&self) -> Result<(), BackendError> {
        self.post_json(STOP, &serde_json::json!({})).await
    }

    async fn fetch_logs(&self) -> Result<Vec<String>, BackendError> {
        self.get_json(LOGS).await
    }

    async fn fetch_progress(&self) -> Result<i64, BackendError> {
        self.get_json(PROGRESS).await
    }

    async fn fetch_running(&self) -> Result<bool, BackendError> {
        self.get_json(IS_RUNNING).await
    }

    async fn update_slider(&self, update: SliderUpdate) -> Result<(), BackendError> {
        self.post_json(SLIDER, &SliderRequest::from(update)).await
    }

    async fn fetch_previews(&self, token: u64) -> Result<PreviewImages, BackendError> {
        let (original, modified) = tokio::try_join!(
            self.get_image(ORIGINAL_IMAGE, token),
            self.get_image(MODIFIED_IMAGE, token)
        )?;
        Ok(PreviewImages { original, modified })
    }

    async fn submit_colour(&self, name: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint(SUBMIT_COLOUR)?)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(name.to_owned())
            .send()
            .await
            .map_err(|error| BackendError::Http {
                endpoint: SUBMIT_COLOUR,
                error,
            })?;
        checked(SUBMIT_COLOUR, response).await.map(drop)
    }
}
