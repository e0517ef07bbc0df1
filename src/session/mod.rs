pub mod catalog;
pub mod debounce;
pub mod log_view;
pub mod progress;
pub mod run_config;
pub mod run_state;
pub mod tuner;
pub mod validation;

use std::collections::VecDeque;

pub use catalog::{ScriptCatalog, ScriptCatalogEntry, SelectionChange, PLACEHOLDER_ENTRY};
pub use log_view::{LogMutation, LogView, ScrollAction};
pub use progress::ProgressValue;
pub use run_config::{build_run_config, RunConfig, RunConfigDraft, WindowMode};
pub use run_state::{RunCommand, RunCompletion, RunPhase, RunRequestKind, RunStateReconciler};
pub use tuner::{
    ParameterTuner, PreviewImages, PreviewStatus, SliderChannel, SliderState, SliderUpdate,
};
pub use validation::{validate_colour_name, ValidationError};

use crate::config::ConsoleConfig;

const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Everything the operator sees, owned in one place and handed by reference
/// to each component.
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    pub catalog: ScriptCatalog,
    pub draft: RunConfigDraft,
    pub run_state: RunStateReconciler,
    pub logs: LogView,
    pub progress: ProgressValue,
    pub tuner: ParameterTuner,
    alert: Option<String>,
    notices: VecDeque<Notice>,
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self::new(&ConsoleConfig::default())
    }
}

impl ConsoleSession {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            catalog: ScriptCatalog::new(),
            draft: RunConfigDraft::new(),
            run_state: RunStateReconciler::new(),
            logs: LogView::new(config.log_retention_lines, config.near_bottom_rows),
            progress: ProgressValue::default(),
            tuner: ParameterTuner::new(config.slider_debounce),
            alert: None,
            notices: VecDeque::new(),
        }
    }

    /// Blocking message the operator must dismiss (validation failures).
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn push_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            text: text.into(),
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
