use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;

use crate::backend::{Backend, BackendError};
use crate::config::ConsoleConfig;
use crate::session::{
    build_run_config, validate_colour_name, LogView, NoticeLevel, ParameterTuner, ProgressValue,
    RunStateReconciler, ScriptCatalog, SliderChannel, SliderUpdate, ValidationError, WindowMode,
};
use crate::sync::{ConnectionManager, FeedEvent, TopicUpdate};
use crate::ui::{
    GaugeHandle, KeyValue, MessageBlock, Renderer, StepState, TableSpec, UiError, UiResult,
};
use crate::{SliderArgs, StartArgs};

#[derive(Debug)]
pub enum CommandError {
    Backend(BackendError),
    Validation(ValidationError),
    Ui(UiError),
}

impl CommandError {
    /// Bad operator input exits with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Validation(_) => 2,
            CommandError::Backend(_) | CommandError::Ui(_) => 1,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CommandError::Backend(_) => "Backend request failed",
            CommandError::Validation(_) => "Invalid input",
            CommandError::Ui(_) => "Output failed",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Backend(error) => write!(f, "{error}"),
            CommandError::Validation(error) => write!(f, "{error}"),
            CommandError::Ui(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Backend(error) => Some(error),
            CommandError::Validation(error) => Some(error),
            CommandError::Ui(error) => Some(error),
        }
    }
}

impl From<BackendError> for CommandError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<ValidationError> for CommandError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<UiError> for CommandError {
    fn from(value: UiError) -> Self {
        Self::Ui(value)
    }
}

pub async fn list_scripts<R: Renderer>(
    backend: &dyn Backend,
    renderer: &mut R,
) -> Result<(), CommandError> {
    let catalog = ScriptCatalog::from_fetched(backend.list_scripts().await?);
    renderer.section("Scripts")?;
    if catalog.entries().is_empty() {
        renderer.notice(NoticeLevel::Warning, "backend reported no runnable scripts")?;
        return Ok(());
    }
    let rows = catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| vec![(idx + 1).to_string(), entry.name.clone()])
        .collect();
    renderer.table(&TableSpec::new(
        vec!["#".to_owned(), "script".to_owned()],
        rows,
    ))?;
    Ok(())
}

/// Validates locally, confirms the script exists, then issues the start.
pub async fn start_run<R: Renderer>(
    backend: &dyn Backend,
    renderer: &mut R,
    args: &StartArgs,
) -> Result<(), CommandError> {
    let mode = args
        .mode
        .as_deref()
        .map(str::parse::<WindowMode>)
        .transpose()?;
    let config = build_run_config(
        args.script.as_deref(),
        args.duration.as_deref().unwrap_or_default(),
        mode,
    )?;
    let mut catalog = ScriptCatalog::from_fetched(backend.list_scripts().await?);
    catalog.select(config.script_id())?;

    let spinner = renderer.spinner(&format!("Starting {}", config.script_id()))?;
    if let Err(error) = backend.start_run(&config).await {
        spinner.finish_error("start rejected");
        return Err(error.into());
    }
    spinner.finish_success("started");
    renderer.success_block(&MessageBlock::new(
        "Run started",
        format!(
            "{} for {} min, {} window",
            config.script_id(),
            config.duration_minutes(),
            config.window_mode()
        ),
    ))?;
    Ok(())
}

pub async fn stop_run<R: Renderer>(
    backend: &dyn Backend,
    renderer: &mut R,
) -> Result<(), CommandError> {
    let spinner = renderer.spinner("Stopping run")?;
    if let Err(error) = backend.stop_run().await {
        spinner.finish_error("stop rejected");
        return Err(error.into());
    }
    spinner.finish_success("stopped");
    renderer.notice(NoticeLevel::Success, "stop requested")?;
    Ok(())
}

pub async fn show_status<R: Renderer>(
    backend: &dyn Backend,
    renderer: &mut R,
    config: &ConsoleConfig,
) -> Result<(), CommandError> {
    let (running, raw_progress) =
        tokio::try_join!(backend.fetch_running(), backend.fetch_progress())?;
    let mut progress = ProgressValue::default();
    progress.set(raw_progress);
    renderer.key_values(&[
        KeyValue::new("backend", config.backend_url.clone()),
        KeyValue::new("running", if running { "yes" } else { "no" }),
        KeyValue::new("progress", progress.label()),
    ])?;
    Ok(())
}

/// Sends one slider value, then refreshes both previews the way the console
/// does after a debounced edit.
pub async fn send_slider<R: Renderer>(
    backend: &dyn Backend,
    renderer: &mut R,
    args: &SliderArgs,
) -> Result<(), CommandError> {
    let channel = args.channel.parse::<SliderChannel>()?;
    let raw = args
        .value
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidSliderValue(args.value.trim().to_owned()))?;
    let update = SliderUpdate {
        channel,
        value: channel.clamp(raw),
    };
    if i64::from(update.value) != raw {
        renderer.notice(
            NoticeLevel::Warning,
            &format!("{channel} clamped to {} (range 0-{})", update.value, channel.max_value()),
        )?;
    }
    let label = format!("{channel} = {}", update.value);
    if let Err(error) = backend.update_slider(update).await {
        renderer.step(&label, StepState::Failed)?;
        return Err(error.into());
    }
    renderer.step(&label, StepState::Done)?;

    let mut tuner = ParameterTuner::default();
    let token = tuner.next_preview_token();
    match backend.fetch_previews(token).await {
        Ok(images) => {
            tuner.record_previews(token, &images);
            let status = tuner.previews();
            renderer.key_values(&[
                KeyValue::new("preview token", token.to_string()),
                KeyValue::new("original", format!("{} bytes", status.original_bytes)),
                KeyValue::new("modified", format!("{} bytes", status.modified_bytes)),
            ])?;
        }
        Err(error) => {
            tracing::warn!(token, %error, "preview refresh failed");
            renderer.notice(NoticeLevel::Warning, &format!("preview refresh failed: {error}"))?;
        }
    }
    Ok(())
}

pub async fn submit_colour<R: Renderer>(
    backend: &dyn Backend,
    renderer: &mut R,
    raw: &str,
) -> Result<(), CommandError> {
    let name = validate_colour_name(raw)?;
    backend.submit_colour(&name).await?;
    renderer.success_block(&MessageBlock::new(
        "Colour saved",
        format!("`{name}` submitted from the current slider ranges"),
    ))?;
    Ok(())
}

/// Prints topic updates for `watch`. Log snapshots are reconciled through a
/// [`LogView`] so only unseen lines are printed.
pub struct WatchPrinter {
    logs: LogView,
    progress: ProgressValue,
    run_state: RunStateReconciler,
    gauge: Option<Box<dyn GaugeHandle>>,
}

impl WatchPrinter {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            logs: LogView::new(config.log_retention_lines, config.near_bottom_rows),
            progress: ProgressValue::default(),
            run_state: RunStateReconciler::new(),
            gauge: None,
        }
    }

    pub fn attach_gauge(&mut self, gauge: Box<dyn GaugeHandle>) {
        self.gauge = Some(gauge);
    }

    pub fn apply<R: Renderer>(&mut self, event: FeedEvent, renderer: &mut R) -> UiResult<()> {
        match event {
            FeedEvent::Connected(topic) => {
                tracing::info!(%topic, "watching topic");
                Ok(())
            }
            FeedEvent::Disconnected(topic) => {
                tracing::info!(%topic, "topic disconnected; waiting for reconnect");
                Ok(())
            }
            FeedEvent::Update(_, TopicUpdate::LogLine(line)) => {
                self.logs.append(line.clone());
                self.emit(renderer, &line)
            }
            FeedEvent::Update(_, TopicUpdate::LogSnapshot(lines)) => {
                let overlap = self.logs.snapshot_overlap(&lines);
                let fresh = lines[overlap..].to_vec();
                self.logs.replace_all(lines);
                for line in &fresh {
                    self.emit(renderer, line)?;
                }
                Ok(())
            }
            FeedEvent::Update(_, TopicUpdate::Progress(raw)) => {
                if !self.progress.set(raw) {
                    return Ok(());
                }
                match &self.gauge {
                    Some(gauge) => {
                        gauge.set_percent(self.progress.percent());
                        Ok(())
                    }
                    None => renderer.notice(
                        NoticeLevel::Info,
                        &format!("progress {}", self.progress.label()),
                    ),
                }
            }
            FeedEvent::Update(_, TopicUpdate::Running(running)) => {
                let first = self.run_state.confirmed().is_none();
                if !self.run_state.observe(running) && !first {
                    return Ok(());
                }
                let label = if running { "running" } else { "stopped" };
                match &self.gauge {
                    Some(gauge) => {
                        gauge.set_message(label);
                        Ok(())
                    }
                    None => renderer.notice(NoticeLevel::Info, &format!("run {label}")),
                }
            }
        }
    }

    fn emit<R: Renderer>(&self, renderer: &mut R, line: &str) -> UiResult<()> {
        match &self.gauge {
            Some(gauge) => {
                gauge.println(line);
                Ok(())
            }
            None => renderer.text(line),
        }
    }

    pub fn finish(&self) {
        if let Some(gauge) = &self.gauge {
            gauge.finish();
        }
    }
}

/// Streams all three topics until `until` resolves or every channel task
/// has exited.
pub async fn watch<R, F>(
    config: &ConsoleConfig,
    backend: Arc<dyn Backend>,
    renderer: &mut R,
    until: F,
) -> Result<(), CommandError>
where
    R: Renderer,
    F: Future<Output = ()>,
{
    let (mut manager, mut feed) = ConnectionManager::start(config, backend)?;
    renderer.notice(
        NoticeLevel::Info,
        &format!(
            "watching {} over {} (Ctrl-C to stop)",
            config.backend_url,
            config.transport.label()
        ),
    )?;
    let mut printer = WatchPrinter::new(config);
    if renderer.progress_enabled() {
        printer.attach_gauge(renderer.gauge("progress")?);
    }

    tokio::pin!(until);
    let outcome = loop {
        tokio::select! {
            _ = &mut until => break Ok(()),
            event = feed.next() => match event {
                Some(event) => {
                    if let Err(error) = printer.apply(event, renderer) {
                        break Err(error.into());
                    }
                }
                None => break Ok(()),
            },
        }
    };
    manager.shutdown();
    printer.finish();
    outcome
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
