use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoScriptSelected,
    UnknownScript(String),
    InvalidDuration(String),
    NonPositiveDuration,
    NoWindowMode,
    UnknownWindowMode(String),
    EmptyColourName,
    ColourNameHasWhitespace,
    UnknownSliderChannel(String),
    InvalidSliderValue(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoScriptSelected => write!(f, "Please select a script."),
            ValidationError::UnknownScript(name) => {
                write!(f, "Script `{name}` is not in the catalog.")
            }
            ValidationError::InvalidDuration(raw) if raw.is_empty() => {
                write!(f, "Please enter a duration in minutes.")
            }
            ValidationError::InvalidDuration(raw) => {
                write!(f, "Duration `{raw}` is not a whole number of minutes.")
            }
            ValidationError::NonPositiveDuration => {
                write!(f, "Duration must be greater than 0.")
            }
            ValidationError::NoWindowMode => write!(f, "Please choose a window mode."),
            ValidationError::UnknownWindowMode(raw) => write!(
                f,
                "Window mode `{raw}` is not recognised (expected Fixed or Resizable)."
            ),
            ValidationError::EmptyColourName => write!(f, "Please enter a name."),
            ValidationError::ColourNameHasWhitespace => write!(f, "Name contains spaces."),
            ValidationError::UnknownSliderChannel(raw) => write!(
                f,
                "Unknown slider `{raw}` (expected hueMin, satMin, valMin, hueMax, satMax or valMax)."
            ),
            ValidationError::InvalidSliderValue(raw) => {
                write!(f, "Slider value `{raw}` is not a whole number.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trims the operator-entered colour name and rejects empty names or names
/// containing whitespace.
pub fn validate_colour_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyColourName);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::ColourNameHasWhitespace);
    }
    Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_name_is_trimmed() {
        assert_eq!(validate_colour_name("  ruby ").expect("valid"), "ruby");
    }

    #[test]
    fn colour_name_rejects_blank_and_inner_whitespace() {
        assert_eq!(
            validate_colour_name("   "),
            Err(ValidationError::EmptyColourName)
        );
        assert_eq!(
            validate_colour_name("dark red"),
            Err(ValidationError::ColourNameHasWhitespace)
        );
        assert_eq!(
            validate_colour_name("dark\tred"),
            Err(ValidationError::ColourNameHasWhitespace)
        );
    }
}
