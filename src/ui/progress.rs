use std::sync::Arc;

use indicatif::ProgressBar;

use crate::ui::renderer::{GaugeHandle, SpinnerHandle};

#[derive(Debug, Default)]
pub struct NoopSpinnerHandle;

impl SpinnerHandle for NoopSpinnerHandle {
    fn set_message(&self, _message: &str) {}

    fn finish_success(&self, _message: &str) {}

    fn finish_error(&self, _message: &str) {}
}

impl GaugeHandle for NoopSpinnerHandle {
    fn set_percent(&self, _percent: u8) {}

    fn set_message(&self, _message: &str) {}

    fn println(&self, _line: &str) {}

    fn finish(&self) {}
}

/// Shared wrapper over an indicatif bar, used for both spinners and the run
/// progress gauge.
#[derive(Debug, Clone)]
pub struct IndicatifHandle {
    progress: Arc<ProgressBar>,
}

impl IndicatifHandle {
    pub fn new(progress: ProgressBar) -> Self {
        Self {
            progress: Arc::new(progress),
        }
    }
}

impl SpinnerHandle for IndicatifHandle {
    fn set_message(&self, message: &str) {
        self.progress.set_message(message.to_owned());
    }

    fn finish_success(&self, message: &str) {
        self.progress.finish_with_message(message.to_owned());
    }

    fn finish_error(&self, message: &str) {
        self.progress.abandon_with_message(message.to_owned());
    }
}

impl GaugeHandle for IndicatifHandle {
    fn set_percent(&self, percent: u8) {
        self.progress.set_position(u64::from(percent.min(100)));
    }

    fn set_message(&self, message: &str) {
        self.progress.set_message(message.to_owned());
    }

    /// Prints above the bar without tearing it.
    fn println(&self, line: &str) {
        self.progress.println(line);
    }

    fn finish(&self) {
        self.progress.abandon();
    }
}
