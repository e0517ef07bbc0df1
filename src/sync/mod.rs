mod channel;
mod decode;
mod poll;
mod push;

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{push_url, Backend, BackendError};
use crate::config::{ConsoleConfig, PollCadence, TransportMode};

pub use channel::{ChannelMachine, ChannelPhase};
pub use decode::{decode_push, DecodeError};
pub use poll::poll_once;

/// A named update stream, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Logs,
    Progress,
    State,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Logs, Topic::Progress, Topic::State];

    pub fn name(self) -> &'static str {
        match self {
            Topic::Logs => "logs",
            Topic::Progress => "progress",
            Topic::State => "state",
        }
    }

    pub fn push_path(self) -> &'static str {
        match self {
            Topic::Logs => "ws/logs",
            Topic::Progress => "ws/progress",
            Topic::State => "ws/state",
        }
    }

    pub fn poll_period(self, cadence: &PollCadence) -> Duration {
        match self {
            Topic::Logs => cadence.logs,
            Topic::Progress => cadence.progress,
            Topic::State => cadence.state,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Topic::Logs => 0,
            Topic::Progress => 1,
            Topic::State => 2,
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicUpdate {
    /// One incremental line (push).
    LogLine(String),
    /// The backend's full retained buffer (pull).
    LogSnapshot(Vec<String>),
    Progress(i64),
    Running(bool),
}

/// What a transport task reports, tagged with the connection generation that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
    Opened {
        topic: Topic,
        generation: u64,
    },
    Update {
        topic: Topic,
        generation: u64,
        update: TopicUpdate,
    },
    Closed {
        topic: Topic,
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Connected(Topic),
    Disconnected(Topic),
    Update(Topic, TopicUpdate),
}

/// Subscriber end of the connection manager. Drops anything produced by a
/// connection that has since been superseded.
#[derive(Debug)]
pub struct TopicFeed {
    rx: mpsc::UnboundedReceiver<ChannelSignal>,
    current: [Option<u64>; 3],
}

impl TopicFeed {
    pub fn new(rx: mpsc::UnboundedReceiver<ChannelSignal>) -> Self {
        Self {
            rx,
            current: [None; 3],
        }
    }

    #[cfg(test)]
    pub fn current_generation(&self, topic: Topic) -> Option<u64> {
        self.current[topic.index()]
    }

    pub fn accept(&mut self, signal: ChannelSignal) -> Option<FeedEvent> {
        match signal {
            ChannelSignal::Opened { topic, generation } => {
                let slot = &mut self.current[topic.index()];
                if slot.is_some_and(|current| current >= generation) {
                    return None;
                }
                *slot = Some(generation);
                Some(FeedEvent::Connected(topic))
            }
            ChannelSignal::Update {
                topic,
                generation,
                update,
            } => {
                if self.current[topic.index()] != Some(generation) {
                    tracing::debug!(%topic, generation, "dropping update from superseded connection");
                    return None;
                }
                Some(FeedEvent::Update(topic, update))
            }
            ChannelSignal::Closed { topic, generation } => {
                let slot = &mut self.current[topic.index()];
                if *slot != Some(generation) {
                    return None;
                }
                *slot = None;
                Some(FeedEvent::Disconnected(topic))
            }
        }
    }

    /// Next deliverable event, or `None` once every transport task is gone.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        while let Some(signal) = self.rx.recv().await {
            if let Some(event) = self.accept(signal) {
                return Some(event);
            }
        }
        None
    }
}

/// Owns one transport task per topic.
#[derive(Debug)]
pub struct ConnectionManager {
    tasks: Vec<JoinHandle<()>>,
}

impl ConnectionManager {
    pub fn start(
        config: &ConsoleConfig,
        backend: Arc<dyn Backend>,
    ) -> Result<(Self, TopicFeed), BackendError> {
        Self::start_topics(config, backend, &Topic::ALL)
    }

    pub fn start_topics(
        config: &ConsoleConfig,
        backend: Arc<dyn Backend>,
        topics: &[Topic],
    ) -> Result<(Self, TopicFeed), BackendError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut tasks = Vec::with_capacity(topics.len());
        match config.transport {
            TransportMode::Push => {
                let base = crate::backend::parse_base_url(&config.backend_url)?;
                for &topic in topics {
                    let url = push_url(&base, topic)?;
                    tasks.push(tokio::spawn(push::run(
                        topic,
                        url.to_string(),
                        config.reconnect_delay,
                        tx.clone(),
                    )));
                }
            }
            TransportMode::Pull => {
                for &topic in topics {
                    tasks.push(tokio::spawn(poll::run(
                        topic,
                        Arc::clone(&backend),
                        topic.poll_period(&config.poll),
                        tx.clone(),
                    )));
                }
            }
        }
        tracing::info!(
            transport = config.transport.label(),
            topics = topics.len(),
            "connection manager started"
        );
        Ok((Self { tasks }, TopicFeed::new(rx)))
    }

    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../tests/sync_tests.rs"]
mod tests;
