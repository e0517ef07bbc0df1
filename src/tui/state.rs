use crate::session::SliderChannel;

use super::config::MAX_COLOUR_INPUT;

/// Pane that receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum Focus {
    #[default]
    Catalog,
    RunForm,
    Logs,
    Tuner,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Catalog, Focus::RunForm, Focus::Logs, Focus::Tuner];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or_default()
    }

    pub(super) fn next(self) -> Focus {
        Self::ORDER[next_index(self.position(), Self::ORDER.len())]
    }

    pub(super) fn prev(self) -> Focus {
        Self::ORDER[prev_index(self.position(), Self::ORDER.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum InputMode {
    #[default]
    Command,
    /// Typing a colour name in the footer prompt.
    ColourName,
}

/// Presentation-only state. Everything the backend cares about lives in the
/// console session.
#[derive(Debug, Clone, Default)]
pub(super) struct ViewState {
    pub(super) focus: Focus,
    pub(super) input_mode: InputMode,
    pub(super) colour_input: String,
    pub(super) slider_index: usize,
    pub(super) show_help: bool,
    pub(super) viewport_rows: usize,
}

impl ViewState {
    pub(super) fn selected_slider(&self) -> SliderChannel {
        SliderChannel::ALL[self.slider_index.min(SliderChannel::ALL.len() - 1)]
    }

    pub(super) fn next_slider(&mut self) {
        self.slider_index = next_index(self.slider_index, SliderChannel::ALL.len());
    }

    pub(super) fn prev_slider(&mut self) {
        self.slider_index = prev_index(self.slider_index, SliderChannel::ALL.len());
    }

    pub(super) fn begin_colour_input(&mut self) {
        self.input_mode = InputMode::ColourName;
        self.colour_input.clear();
    }

    pub(super) fn push_colour_char(&mut self, ch: char) {
        if self.colour_input.chars().count() < MAX_COLOUR_INPUT {
            self.colour_input.push(ch);
        }
    }

    /// Leaves the prompt and hands back whatever was typed.
    pub(super) fn take_colour_input(&mut self) -> String {
        self.input_mode = InputMode::Command;
        std::mem::take(&mut self.colour_input)
    }
}

pub(super) fn next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

pub(super) fn prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}
