use std::time::Instant;

use crate::config::ConsoleConfig;
use crate::session::{
    validate_colour_name, ConsoleSession, NoticeLevel, PreviewImages, RunCommand, RunConfig,
    RunRequestKind, ScrollAction, SliderChannel, SliderUpdate, WindowMode,
};
use crate::sync::{FeedEvent, Topic, TopicUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorAction {
    SelectNext,
    SelectPrev,
    SelectScript(String),
    ReloadScripts,
    DurationChar(char),
    DurationBackspace,
    CycleWindowMode,
    SetWindowMode(WindowMode),
    ToggleRun,
    Scroll(ScrollAction),
    SetViewportRows(usize),
    NudgeSlider { channel: SliderChannel, delta: i64 },
    SetSlider { channel: SliderChannel, value: i64 },
    RefreshPreviews,
    SubmitColour(String),
    DismissAlert,
}

/// Outcome of an [`Effect`] once the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Scripts(Result<Vec<String>, String>),
    Run {
        kind: RunRequestKind,
        result: Result<(), String>,
    },
    Slider {
        update: SliderUpdate,
        result: Result<(), String>,
    },
    Previews {
        token: u64,
        result: Result<PreviewImages, String>,
    },
    Colour {
        name: String,
        result: Result<(), String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Feed(FeedEvent),
    Operator(OperatorAction),
    Completed(Completion),
    /// A timer deadline passed; flushes due slider updates.
    Tick,
}

/// A backend request the runtime must issue on the console's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadScripts,
    StartRun(RunConfig),
    StopRun,
    SendSlider(SliderUpdate),
    FetchPreviews { token: u64 },
    SubmitColour(String),
}

/// Single owner of the session state. Every input arrives as a
/// [`ConsoleEvent`]; every backend request leaves as an [`Effect`].
#[derive(Debug, Clone)]
pub struct Console {
    session: ConsoleSession,
    links: [bool; 3],
}

impl Default for Console {
    fn default() -> Self {
        Self::new(&ConsoleConfig::default())
    }
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            session: ConsoleSession::new(config),
            links: [false; 3],
        }
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    pub fn link_up(&self, topic: Topic) -> bool {
        self.links[topic.index()]
    }

    /// Requests issued once when the console opens.
    pub fn boot(&mut self) -> Vec<Effect> {
        let token = self.session.tuner.next_preview_token();
        vec![Effect::LoadScripts, Effect::FetchPreviews { token }]
    }

    /// Earliest instant at which a [`ConsoleEvent::Tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.tuner.next_deadline()
    }

    pub fn handle(&mut self, event: ConsoleEvent, now: Instant) -> Vec<Effect> {
        let mut effects = match event {
            ConsoleEvent::Feed(feed) => {
                self.apply_feed(feed);
                Vec::new()
            }
            ConsoleEvent::Operator(action) => self.apply_action(action, now),
            ConsoleEvent::Completed(completion) => self.apply_completion(completion),
            ConsoleEvent::Tick => Vec::new(),
        };
        effects.extend(
            self.session
                .tuner
                .due_updates(now)
                .into_iter()
                .map(Effect::SendSlider),
        );
        effects
    }

    fn apply_feed(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Connected(topic) => self.links[topic.index()] = true,
            FeedEvent::Disconnected(topic) => self.links[topic.index()] = false,
            FeedEvent::Update(_, TopicUpdate::LogLine(line)) => {
                self.session.logs.append(line);
            }
            FeedEvent::Update(_, TopicUpdate::LogSnapshot(lines)) => {
                self.session.logs.replace_all(lines);
            }
            FeedEvent::Update(_, TopicUpdate::Progress(percent)) => {
                self.session.progress.set(percent);
            }
            FeedEvent::Update(_, TopicUpdate::Running(running)) => {
                if self.session.run_state.observe(running) {
                    tracing::info!(running, "run state changed by backend");
                }
            }
        }
    }

    fn apply_action(&mut self, action: OperatorAction, now: Instant) -> Vec<Effect> {
        if action == OperatorAction::ToggleRun {
            return self.toggle_run();
        }
        let session = &mut self.session;
        match action {
            OperatorAction::SelectNext => {
                session.catalog.select_next();
            }
            OperatorAction::SelectPrev => {
                session.catalog.select_prev();
            }
            OperatorAction::SelectScript(name) => {
                if let Err(error) = session.catalog.select(&name) {
                    session.raise_alert(error.to_string());
                }
            }
            OperatorAction::ReloadScripts => {
                if !session.catalog.is_loaded() {
                    return vec![Effect::LoadScripts];
                }
            }
            OperatorAction::DurationChar(ch) => session.draft.push_duration_char(ch),
            OperatorAction::DurationBackspace => session.draft.pop_duration_char(),
            OperatorAction::CycleWindowMode => {
                session.draft.cycle_window_mode();
            }
            OperatorAction::SetWindowMode(mode) => session.draft.window_mode = Some(mode),
            OperatorAction::ToggleRun => {}
            OperatorAction::Scroll(scroll) => session.logs.scroll(scroll),
            OperatorAction::SetViewportRows(rows) => session.logs.set_viewport_rows(rows),
            OperatorAction::NudgeSlider { channel, delta } => {
                session.tuner.nudge(channel, delta, now);
            }
            OperatorAction::SetSlider { channel, value } => {
                session.tuner.edit(channel, value, now);
            }
            OperatorAction::RefreshPreviews => {
                let token = session.tuner.next_preview_token();
                return vec![Effect::FetchPreviews { token }];
            }
            OperatorAction::SubmitColour(raw) => match validate_colour_name(&raw) {
                Ok(name) => return vec![Effect::SubmitColour(name)],
                Err(error) => session.raise_alert(error.to_string()),
            },
            OperatorAction::DismissAlert => {
                session.dismiss_alert();
            }
        }
        Vec::new()
    }

    fn toggle_run(&mut self) -> Vec<Effect> {
        let session = &mut self.session;
        if let Some(kind) = session.run_state.in_flight() {
            tracing::debug!(request = kind.label(), "toggle ignored; request in flight");
            return Vec::new();
        }
        let command = match session.run_state.toggle_kind() {
            RunRequestKind::Start => {
                let selected = session.catalog.selected().map(|entry| entry.name.as_str());
                match session.draft.build(selected) {
                    Ok(config) => RunCommand::Start(config),
                    Err(error) => {
                        session.raise_alert(error.to_string());
                        return Vec::new();
                    }
                }
            }
            RunRequestKind::Stop => RunCommand::Stop,
        };
        if session.run_state.begin(&command).is_err() {
            return Vec::new();
        }
        tracing::info!(request = command.kind().label(), "issuing run request");
        match command {
            RunCommand::Start(config) => vec![Effect::StartRun(config)],
            RunCommand::Stop => vec![Effect::StopRun],
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> Vec<Effect> {
        let session = &mut self.session;
        match completion {
            Completion::Scripts(Ok(names)) => {
                if session.catalog.load(names) {
                    let count = session.catalog.entries().len();
                    session.push_notice(NoticeLevel::Info, format!("{count} scripts available"));
                }
            }
            Completion::Scripts(Err(error)) => {
                tracing::warn!(%error, "script catalog fetch failed");
                session.push_notice(
                    NoticeLevel::Error,
                    format!("Could not load scripts: {error} (press r to retry)"),
                );
            }
            Completion::Run { kind, result } => {
                let outcome = session.run_state.complete(kind, result);
                match outcome.error {
                    Some(error) => {
                        tracing::warn!(request = kind.label(), %error, "run request failed");
                        session.push_notice(
                            NoticeLevel::Error,
                            format!("Failed to {} run: {error}", kind.label()),
                        );
                    }
                    None => {
                        let text = match kind {
                            RunRequestKind::Start => "Run started",
                            RunRequestKind::Stop => "Run stopped",
                        };
                        session.push_notice(NoticeLevel::Success, text);
                    }
                }
            }
            Completion::Slider { update, result } => match result {
                Ok(()) => {
                    let token = session.tuner.next_preview_token();
                    return vec![Effect::FetchPreviews { token }];
                }
                Err(error) => {
                    tracing::warn!(slider = update.channel.id(), value = update.value, %error, "slider update failed");
                    session.push_notice(
                        NoticeLevel::Warning,
                        format!("{} update failed: {error}", update.channel),
                    );
                }
            },
            Completion::Previews { token, result } => match result {
                Ok(images) => session.tuner.record_previews(token, &images),
                Err(error) => tracing::warn!(token, %error, "preview refresh failed"),
            },
            Completion::Colour { name, result } => match result {
                Ok(()) => {
                    session.push_notice(NoticeLevel::Success, format!("Saved colour `{name}`"))
                }
                Err(error) => {
                    tracing::warn!(%name, %error, "colour submission failed");
                    session.push_notice(
                        NoticeLevel::Error,
                        format!("Could not save colour `{name}`: {error}"),
                    );
                }
            },
        }
        Vec::new()
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
