use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::console::{Completion, ConsoleEvent, Effect};
use crate::session::RunRequestKind;

/// Issues one effect against the backend and reports its outcome.
pub async fn execute(backend: &dyn Backend, effect: Effect) -> Completion {
    match effect {
        Effect::LoadScripts => Completion::Scripts(
            backend
                .list_scripts()
                .await
                .map_err(|error| error.to_string()),
        ),
        Effect::StartRun(config) => Completion::Run {
            kind: RunRequestKind::Start,
            result: backend
                .start_run(&config)
                .await
                .map_err(|error| error.to_string()),
        },
        Effect::StopRun => Completion::Run {
            kind: RunRequestKind::Stop,
            result: backend.stop_run().await.map_err(|error| error.to_string()),
        },
        Effect::SendSlider(update) => Completion::Slider {
            update,
            result: backend
                .update_slider(update)
                .await
                .map_err(|error| error.to_string()),
        },
        Effect::FetchPreviews { token } => Completion::Previews {
            token,
            result: backend
                .fetch_previews(token)
                .await
                .map_err(|error| error.to_string()),
        },
        Effect::SubmitColour(name) => {
            let result = backend
                .submit_colour(&name)
                .await
                .map_err(|error| error.to_string());
            Completion::Colour { name, result }
        }
    }
}

/// Runs effects as detached tasks whose completions re-enter the console's
/// event queue. Requests are never cancelled; a completion arriving after
/// the queue closed is discarded.
#[derive(Clone)]
pub struct EffectRunner {
    backend: Arc<dyn Backend>,
    events: mpsc::UnboundedSender<ConsoleEvent>,
}

impl EffectRunner {
    pub fn new(backend: Arc<dyn Backend>, events: mpsc::UnboundedSender<ConsoleEvent>) -> Self {
        Self { backend, events }
    }

    pub fn spawn(&self, effect: Effect) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let completion = execute(backend.as_ref(), effect).await;
            let _ = events.send(ConsoleEvent::Completed(completion));
        })
    }

    pub fn spawn_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.spawn(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Console;
    use crate::session::{SliderChannel, SliderUpdate};
    use crate::testing::{BackendCall, ScriptedBackend};
    use std::time::Instant;

    #[tokio::test]
    async fn completions_reenter_the_queue() {
        let backend = Arc::new(ScriptedBackend::with_scripts(["alpha.script"]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(backend.clone(), tx);
        let mut console = Console::default();

        runner.spawn_all(console.boot());
        for _ in 0..2 {
            let event = rx.recv().await.expect("completion");
            runner.spawn_all(console.handle(event, Instant::now()));
        }
        assert_eq!(console.session().catalog.names(), vec!["alpha.script"]);
        assert_eq!(console.session().tuner.previews().refreshes, 1);
    }

    #[tokio::test]
    async fn backend_errors_become_messages() {
        let backend = ScriptedBackend::new();
        backend.fail("api/slider");
        let update = SliderUpdate {
            channel: SliderChannel::SatMin,
            value: 12,
        };
        let completion = execute(&backend, Effect::SendSlider(update)).await;
        assert_eq!(
            completion,
            Completion::Slider {
                update,
                result: Err("api/slider returned HTTP 500: scripted failure".to_owned()),
            }
        );
        assert_eq!(backend.calls(), vec![BackendCall::UpdateSlider(update)]);
    }
}
