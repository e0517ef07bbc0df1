use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::backend::{Backend, BackendError};
use crate::session::{PreviewImages, RunConfig, SliderUpdate};

/// One call observed by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListScripts,
    StartRun {
        script: String,
        duration_minutes: u32,
        fixed: bool,
    },
    StopRun,
    FetchLogs,
    FetchProgress,
    FetchRunning,
    UpdateSlider(SliderUpdate),
    FetchPreviews(u64),
    SubmitColour(String),
}

impl BackendCall {
    pub fn endpoint(&self) -> &'static str {
        match self {
            BackendCall::ListScripts => "api/scripts",
            BackendCall::StartRun { .. } => "api/runConfig",
            BackendCall::StopRun => "api/stop",
            BackendCall::FetchLogs => "api/logs",
            BackendCall::FetchProgress => "api/progress",
            BackendCall::FetchRunning => "api/isRunning",
            BackendCall::UpdateSlider(_) => "api/slider",
            BackendCall::FetchPreviews(_) => "api/originalImage",
            BackendCall::SubmitColour(_) => "api/submitColour",
        }
    }
}

#[derive(Debug, Default)]
struct ScriptedState {
    scripts: Vec<String>,
    running: bool,
    logs: Vec<String>,
    progress: i64,
    failing: BTreeSet<&'static str>,
    calls: Vec<BackendCall>,
}

/// In-memory [`Backend`] with the reference backend's observable behaviour,
/// recording every call and failing selected endpoints on demand.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    state: Mutex<ScriptedState>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripts<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        backend.lock().scripts = scripts.into_iter().map(Into::into).collect();
        backend
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_running(&self, running: bool) {
        self.lock().running = running;
    }

    pub fn push_log(&self, line: impl Into<String>) {
        self.lock().logs.push(line.into());
    }

    pub fn set_progress(&self, percent: i64) {
        self.lock().progress = percent;
    }

    /// Makes every later call to `endpoint` fail with HTTP 500.
    pub fn fail(&self, endpoint: &'static str) {
        self.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.lock().failing.remove(endpoint);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    fn record(&self, call: BackendCall) -> Result<MutexGuard<'_, ScriptedState>, BackendError> {
        let endpoint = call.endpoint();
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(endpoint) {
            return Err(BackendError::Status {
                endpoint,
                status: 500,
                body: "scripted failure".to_owned(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn list_scripts(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.record(BackendCall::ListScripts)?.scripts.clone())
    }

    async fn start_run(&self, config: &RunConfig) -> Result<(), BackendError> {
        let mut state = self.record(BackendCall::StartRun {
            script: config.script_id().to_owned(),
            duration_minutes: config.duration_minutes(),
            fixed: config.window_mode().is_fixed(),
        })?;
        state.running = true;
        Ok(())
    }

    async fn stop_run(&self) -> Result<(), BackendError> {
        self.record(BackendCall::StopRun)?.running = false;
        Ok(())
    }

    async fn fetch_logs(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.record(BackendCall::FetchLogs)?.logs.clone())
    }

    async fn fetch_progress(&self) -> Result<i64, BackendError> {
        Ok(self.record(BackendCall::FetchProgress)?.progress)
    }

    async fn fetch_running(&self) -> Result<bool, BackendError> {
        Ok(self.record(BackendCall::FetchRunning)?.running)
    }

    async fn update_slider(&self, update: SliderUpdate) -> Result<(), BackendError> {
        self.record(BackendCall::UpdateSlider(update)).map(drop)
    }

    async fn fetch_previews(&self, token: u64) -> Result<PreviewImages, BackendError> {
        self.record(BackendCall::FetchPreviews(token))?;
        Ok(PreviewImages {
            original: vec![0x89, b'P', b'N', b'G'],
            modified: vec![0x89, b'P', b'N', b'G', 0],
        })
    }

    async fn submit_colour(&self, name: &str) -> Result<(), BackendError> {
        self.record(BackendCall::SubmitColour(name.to_owned()))
            .map(drop)
    }
}
