use std::time::{Duration, Instant};

use super::Topic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPhase {
    Idle,
    Connecting { generation: u64 },
    Connected { generation: u64 },
    Closed { generation: u64, retry_at: Instant },
}

impl ChannelPhase {
    pub fn label(self) -> &'static str {
        match self {
            ChannelPhase::Idle => "idle",
            ChannelPhase::Connecting { .. } => "connecting",
            ChannelPhase::Connected { .. } => "connected",
            ChannelPhase::Closed { .. } => "closed",
        }
    }
}

/// Lifecycle of one topic's connection.
///
/// Each attempt is tagged with a generation that only grows. A new attempt
/// may begin only from `Idle` or once a `Closed` retry deadline has passed,
/// so at most one attempt is live and at most one retry is pending.
#[derive(Debug, Clone)]
pub struct ChannelMachine {
    topic: Topic,
    phase: ChannelPhase,
    last_generation: u64,
    retry_delay: Duration,
}

impl ChannelMachine {
    pub fn new(topic: Topic, retry_delay: Duration) -> Self {
        Self {
            topic,
            phase: ChannelPhase::Idle,
            last_generation: 0,
            retry_delay,
        }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn phase(&self) -> ChannelPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.last_generation
    }

    pub fn retry_at(&self) -> Option<Instant> {
        match self.phase {
            ChannelPhase::Closed { retry_at, .. } => Some(retry_at),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn pending_retries(&self) -> usize {
        usize::from(self.retry_at().is_some())
    }

    /// Starts a new attempt and returns its generation, or `None` while an
    /// attempt is live or the retry delay has not elapsed.
    pub fn begin_attempt(&mut self, now: Instant) -> Option<u64> {
        let ready = match self.phase {
            ChannelPhase::Idle => true,
            ChannelPhase::Closed { retry_at, .. } => now >= retry_at,
            ChannelPhase::Connecting { .. } | ChannelPhase::Connected { .. } => false,
        };
        if !ready {
            return None;
        }
        self.last_generation += 1;
        self.phase = ChannelPhase::Connecting {
            generation: self.last_generation,
        };
        Some(self.last_generation)
    }

    pub fn opened(&mut self, generation: u64) -> bool {
        match self.phase {
            ChannelPhase::Connecting { generation: live } if live == generation => {
                self.phase = ChannelPhase::Connected { generation };
                true
            }
            _ => false,
        }
    }

    /// Tears down the live attempt and schedules its single retry. A close
    /// for a stale generation, or one arriving while a retry is already
    /// pending, changes nothing and returns `None`.
    pub fn closed(&mut self, generation: u64, now: Instant) -> Option<Instant> {
        match self.phase {
            ChannelPhase::Connecting { generation: live }
            | ChannelPhase::Connected { generation: live }
                if live == generation =>
            {
                let retry_at = now + self.retry_delay;
                self.phase = ChannelPhase::Closed {
                    generation,
                    retry_at,
                };
                Some(retry_at)
            }
            _ => None,
        }
    }

    /// Whether an update tagged `generation` may be delivered.
    pub fn accepts(&self, generation: u64) -> bool {
        matches!(self.phase, ChannelPhase::Connected { generation: live } if live == generation)
    }
}
