use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{decode_push, ChannelMachine, ChannelSignal, DecodeError, Topic};

/// Keeps one websocket open for `topic`, reconnecting after `retry_delay`
/// forever. Returns once the subscriber is gone.
pub(super) async fn run(
    topic: Topic,
    url: String,
    retry_delay: Duration,
    tx: mpsc::UnboundedSender<ChannelSignal>,
) {
    let mut machine = ChannelMachine::new(topic, retry_delay);
    loop {
        let Some(generation) = machine.begin_attempt(Instant::now()) else {
            match machine.retry_at() {
                Some(retry_at) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(retry_at.into()) => continue,
                        _ = tx.closed() => return,
                    }
                }
                None => return,
            }
        };

        tracing::debug!(%topic, generation, %url, "connecting");
        let reason = tokio::select! {
            reason = session(topic, generation, &url, &mut machine, &tx) => reason,
            _ = tx.closed() => return,
        };

        if machine.closed(generation, Instant::now()).is_some() {
            tracing::warn!(
                %topic,
                generation,
                %reason,
                retry_in_ms = retry_delay.as_millis() as u64,
                "channel closed; reconnect scheduled"
            );
            if tx.send(ChannelSignal::Closed { topic, generation }).is_err() {
                return;
            }
        }
    }
}

/// Drives a single connection until it ends and reports why.
async fn session(
    topic: Topic,
    generation: u64,
    url: &str,
    machine: &mut ChannelMachine,
    tx: &mpsc::UnboundedSender<ChannelSignal>,
) -> String {
    let mut stream = match connect_async(url).await {
        Ok((stream, _)) => stream,
        Err(error) => return format!("connect failed: {error}"),
    };
    machine.opened(generation);
    tracing::info!(%topic, generation, "channel connected");
    if tx.send(ChannelSignal::Opened { topic, generation }).is_err() {
        return "subscriber gone".to_owned();
    }

    while let Some(frame) = stream.next().await {
        let decoded = match frame {
            Ok(Message::Text(text)) => decode_push(topic, &text),
            Ok(Message::Binary(bytes)) => Err(DecodeError::BinaryFrame {
                topic,
                len: bytes.len(),
            }),
            Ok(Message::Close(_)) => return "closed by server".to_owned(),
            Ok(_) => continue,
            Err(error) => return format!("stream error: {error}"),
        };
        match decoded {
            Ok(update) if machine.accepts(generation) => {
                let signal = ChannelSignal::Update {
                    topic,
                    generation,
                    update,
                };
                if tx.send(signal).is_err() {
                    return "subscriber gone".to_owned();
                }
            }
            Ok(_) => {}
            Err(error) => tracing::warn!(%topic, %error, "dropping malformed payload"),
        }
    }
    "stream ended".to_owned()
}
