use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::{ChannelMachine, ChannelSignal, Topic, TopicUpdate};
use crate::backend::{Backend, BackendError};

/// Requests `topic` every `period`. A tick that falls due while a request is
/// still outstanding is skipped, so requests never overlap.
pub(super) async fn run(
    topic: Topic,
    backend: Arc<dyn Backend>,
    period: Duration,
    tx: mpsc::UnboundedSender<ChannelSignal>,
) {
    let mut machine = ChannelMachine::new(topic, period);
    let Some(generation) = machine.begin_attempt(Instant::now()) else {
        return;
    };
    machine.opened(generation);
    if tx.send(ChannelSignal::Opened { topic, generation }).is_err() {
        return;
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tx.closed() => return,
        }
        match poll_once(topic, backend.as_ref()).await {
            Ok(update) => {
                let signal = ChannelSignal::Update {
                    topic,
                    generation,
                    update,
                };
                if tx.send(signal).is_err() {
                    return;
                }
            }
            Err(error) if error.is_malformed_payload() => {
                tracing::warn!(%topic, %error, "dropping malformed payload");
            }
            Err(error) => tracing::warn!(%topic, %error, "poll failed; retrying next tick"),
        }
    }
}

pub async fn poll_once(topic: Topic, backend: &dyn Backend) -> Result<TopicUpdate, BackendError> {
    match topic {
        Topic::Logs => backend.fetch_logs().await.map(TopicUpdate::LogSnapshot),
        Topic::Progress => backend.fetch_progress().await.map(TopicUpdate::Progress),
        Topic::State => backend.fetch_running().await.map(TopicUpdate::Running),
    }
}
