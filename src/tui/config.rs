use std::time::Duration;

pub(super) const INPUT_POLL_WAIT: Duration = Duration::from_millis(50);
pub(super) const SLIDER_COARSE_STEP: i64 = 10;
pub(super) const MAX_COLOUR_INPUT: usize = 64;
