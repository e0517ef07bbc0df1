use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Fixed,
    Resizable,
}

impl WindowMode {
    pub const ALL: [WindowMode; 2] = [WindowMode::Fixed, WindowMode::Resizable];

    pub fn label(self) -> &'static str {
        match self {
            WindowMode::Fixed => "Fixed",
            WindowMode::Resizable => "Resizable",
        }
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, WindowMode::Fixed)
    }

    /// Steps through the two modes; an unset mode starts at `Fixed`.
    pub fn cycle(current: Option<WindowMode>) -> WindowMode {
        match current {
            None | Some(WindowMode::Resizable) => WindowMode::Fixed,
            Some(WindowMode::Fixed) => WindowMode::Resizable,
        }
    }
}

impl Display for WindowMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindowMode {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("fixed") {
            Ok(WindowMode::Fixed)
        } else if trimmed.eq_ignore_ascii_case("resizable") {
            Ok(WindowMode::Resizable)
        } else {
            Err(ValidationError::UnknownWindowMode(trimmed.to_owned()))
        }
    }
}

/// Parameters of a single Start request. Built fresh for each Start action
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    script_id: String,
    duration_minutes: u32,
    window_mode: WindowMode,
}

impl RunConfig {
    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn window_mode(&self) -> WindowMode {
        self.window_mode
    }
}

/// Operator-editable inputs for the next Start action. The script comes from
/// the catalog selection; duration stays raw text until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfigDraft {
    pub duration_input: String,
    pub window_mode: Option<WindowMode>,
}

impl RunConfigDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_duration_char(&mut self, ch: char) {
        if ch.is_ascii_digit() || (ch == '-' && self.duration_input.is_empty()) {
            self.duration_input.push(ch);
        }
    }

    pub fn pop_duration_char(&mut self) {
        self.duration_input.pop();
    }

    pub fn cycle_window_mode(&mut self) -> WindowMode {
        let next = WindowMode::cycle(self.window_mode);
        self.window_mode = Some(next);
        next
    }

    pub fn build(&self, selected_script: Option<&str>) -> Result<RunConfig, ValidationError> {
        build_run_config(selected_script, &self.duration_input, self.window_mode)
    }
}

pub fn build_run_config(
    selected_script: Option<&str>,
    duration_input: &str,
    window_mode: Option<WindowMode>,
) -> Result<RunConfig, ValidationError> {
    let script_id = match selected_script.map(str::trim) {
        Some(script) if !script.is_empty() => script.to_owned(),
        _ => return Err(ValidationError::NoScriptSelected),
    };

    let duration_raw = duration_input.trim();
    let duration = duration_raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidDuration(duration_raw.to_owned()))?;
    if duration <= 0 {
        return Err(ValidationError::NonPositiveDuration);
    }
    let duration_minutes = u32::try_from(duration)
        .map_err(|_| ValidationError::InvalidDuration(duration_raw.to_owned()))?;

    let Some(window_mode) = window_mode else {
        return Err(ValidationError::NoWindowMode);
    };

    Ok(RunConfig {
        script_id,
        duration_minutes,
        window_mode,
    })
}
