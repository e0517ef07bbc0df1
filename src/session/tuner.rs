use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use super::debounce::Debouncer;
use super::validation::ValidationError;

pub const DEFAULT_SLIDER_DEBOUNCE: Duration = Duration::from_millis(150);

const HUE_MAX: u16 = 179;
const SAT_VAL_MAX: u16 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SliderChannel {
    HueMin,
    SatMin,
    ValMin,
    HueMax,
    SatMax,
    ValMax,
}

impl SliderChannel {
    pub const ALL: [SliderChannel; 6] = [
        SliderChannel::HueMin,
        SliderChannel::SatMin,
        SliderChannel::ValMin,
        SliderChannel::HueMax,
        SliderChannel::SatMax,
        SliderChannel::ValMax,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SliderChannel::HueMin => "hueMin",
            SliderChannel::SatMin => "satMin",
            SliderChannel::ValMin => "valMin",
            SliderChannel::HueMax => "hueMax",
            SliderChannel::SatMax => "satMax",
            SliderChannel::ValMax => "valMax",
        }
    }

    pub fn max_value(self) -> u16 {
        match self {
            SliderChannel::HueMin | SliderChannel::HueMax => HUE_MAX,
            _ => SAT_VAL_MAX,
        }
    }

    pub fn default_value(self) -> u16 {
        match self {
            SliderChannel::HueMin | SliderChannel::SatMin | SliderChannel::ValMin => 0,
            channel => channel.max_value(),
        }
    }

    pub fn clamp(self, raw: i64) -> u16 {
        raw.clamp(0, i64::from(self.max_value())) as u16
    }

    fn index(self) -> usize {
        match self {
            SliderChannel::HueMin => 0,
            SliderChannel::SatMin => 1,
            SliderChannel::ValMin => 2,
            SliderChannel::HueMax => 3,
            SliderChannel::SatMax => 4,
            SliderChannel::ValMax => 5,
        }
    }
}

impl Display for SliderChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SliderChannel {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        SliderChannel::ALL
            .into_iter()
            .find(|channel| channel.id().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ValidationError::UnknownSliderChannel(raw.trim().to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderUpdate {
    pub channel: SliderChannel,
    pub value: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    values: [u16; 6],
}

impl Default for SliderState {
    fn default() -> Self {
        let mut values = [0u16; 6];
        for channel in SliderChannel::ALL {
            values[channel.index()] = channel.default_value();
        }
        Self { values }
    }
}

impl SliderState {
    pub fn get(&self, channel: SliderChannel) -> u16 {
        self.values[channel.index()]
    }

    pub fn set(&mut self, channel: SliderChannel, raw: i64) -> u16 {
        let value = channel.clamp(raw);
        self.values[channel.index()] = value;
        value
    }
}

/// Raw PNG bytes of the pre- and post-classification previews.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewImages {
    pub original: Vec<u8>,
    pub modified: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewStatus {
    pub token: Option<u64>,
    pub original_bytes: usize,
    pub modified_bytes: usize,
    pub refreshes: usize,
}

/// Operator-side slider values plus the per-channel debounce timers that
/// decide when an edit burst is transmitted.
#[derive(Debug, Clone)]
pub struct ParameterTuner {
    state: SliderState,
    debouncer: Debouncer<SliderChannel, u16>,
    previews: PreviewStatus,
    last_token: u64,
}

impl Default for ParameterTuner {
    fn default() -> Self {
        Self::new(DEFAULT_SLIDER_DEBOUNCE)
    }
}

impl ParameterTuner {
    pub fn new(quiet: Duration) -> Self {
        Self {
            state: SliderState::default(),
            debouncer: Debouncer::new(quiet),
            previews: PreviewStatus::default(),
            last_token: 0,
        }
    }

    pub fn state(&self) -> &SliderState {
        &self.state
    }

    pub fn previews(&self) -> PreviewStatus {
        self.previews
    }

    pub fn is_pending(&self, channel: SliderChannel) -> bool {
        self.debouncer.is_pending(&channel)
    }

    /// Records a raw edit and restarts the channel's quiet window. Returns the
    /// clamped value now shown for the channel.
    pub fn edit(&mut self, channel: SliderChannel, raw: i64, now: Instant) -> u16 {
        let value = self.state.set(channel, raw);
        self.debouncer.schedule(channel, value, now);
        value
    }

    pub fn nudge(&mut self, channel: SliderChannel, delta: i64, now: Instant) -> u16 {
        let current = i64::from(self.state.get(channel));
        self.edit(channel, current + delta, now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// Updates whose quiet period has elapsed, one per channel, carrying the
    /// last value of each burst.
    pub fn due_updates(&mut self, now: Instant) -> Vec<SliderUpdate> {
        self.debouncer
            .fire_due(now)
            .into_iter()
            .map(|(channel, value)| SliderUpdate { channel, value })
            .collect()
    }

    /// Produces a cache-busting token for the next preview fetch. Tokens are
    /// wall-clock milliseconds, forced strictly increasing.
    pub fn next_preview_token(&mut self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        self.last_token = wall.max(self.last_token + 1);
        self.last_token
    }

    pub fn record_previews(&mut self, token: u64, images: &PreviewImages) {
        if self.previews.token.is_some_and(|current| current > token) {
            return;
        }
        self.previews = PreviewStatus {
            token: Some(token),
            original_bytes: images.original.len(),
            modified_bytes: images.modified.len(),
            refreshes: self.previews.refreshes + 1,
        };
    }
}
