use std::fmt::{Display, Formatter};

use super::{Topic, TopicUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    BinaryFrame { topic: Topic, len: usize },
    InvalidProgress(String),
    InvalidState(String),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::BinaryFrame { topic, len } => {
                write!(f, "unexpected {len}-byte binary frame on {topic}")
            }
            DecodeError::InvalidProgress(raw) => write!(f, "progress `{raw}` is not an integer"),
            DecodeError::InvalidState(raw) => {
                write!(f, "state `{raw}` is neither true nor false")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes one text frame received on a push topic.
pub fn decode_push(topic: Topic, text: &str) -> Result<TopicUpdate, DecodeError> {
    match topic {
        Topic::Logs => Ok(TopicUpdate::LogLine(
            text.trim_end_matches(['\r', '\n']).to_owned(),
        )),
        Topic::Progress => {
            let raw = text.trim();
            raw.parse::<i64>()
                .map(TopicUpdate::Progress)
                .map_err(|_| DecodeError::InvalidProgress(raw.to_owned()))
        }
        Topic::State => match text.trim() {
            "true" => Ok(TopicUpdate::Running(true)),
            "false" => Ok(TopicUpdate::Running(false)),
            other => Err(DecodeError::InvalidState(other.to_owned())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_frames_keep_leading_whitespace() {
        assert_eq!(
            decode_push(Topic::Logs, "  indented line\r\n"),
            Ok(TopicUpdate::LogLine("  indented line".to_owned()))
        );
    }

    #[test]
    fn progress_frames_are_trimmed_integers() {
        assert_eq!(
            decode_push(Topic::Progress, " 42\n"),
            Ok(TopicUpdate::Progress(42))
        );
        assert_eq!(
            decode_push(Topic::Progress, "140"),
            Ok(TopicUpdate::Progress(140))
        );
        assert_eq!(
            decode_push(Topic::Progress, "4.5"),
            Err(DecodeError::InvalidProgress("4.5".to_owned()))
        );
    }

    #[test]
    fn state_frames_accept_only_literal_booleans() {
        assert_eq!(
            decode_push(Topic::State, "true"),
            Ok(TopicUpdate::Running(true))
        );
        assert_eq!(
            decode_push(Topic::State, "false\n"),
            Ok(TopicUpdate::Running(false))
        );
        assert!(matches!(
            decode_push(Topic::State, "TRUE"),
            Err(DecodeError::InvalidState(_))
        ));
        assert!(decode_push(Topic::State, "").is_err());
    }
}
