use std::time::Duration;

use super::*;
use crate::sync::Topic;
use crate::testing::{BackendCall, ScriptedBackend};
use crate::ui::PlainRenderer;

fn renderer() -> PlainRenderer<Vec<u8>> {
    PlainRenderer::new(Vec::new(), false)
}

fn output(renderer: PlainRenderer<Vec<u8>>) -> String {
    String::from_utf8(renderer.into_inner()).expect("utf8")
}

fn start_args(script: &str, duration: &str, mode: &str) -> StartArgs {
    StartArgs {
        script: Some(script.to_owned()),
        duration: Some(duration.to_owned()),
        mode: Some(mode.to_owned()),
    }
}

#[tokio::test]
async fn scripts_hides_placeholder_entry() {
    let backend =
        ScriptedBackend::with_scripts(["alpha.script", "package-info.java", "beta.script"]);
    let mut out = renderer();
    list_scripts(&backend, &mut out).await.expect("list");
    let rendered = output(out);
    assert!(rendered.contains("alpha.script"));
    assert!(rendered.contains("beta.script"));
    assert!(!rendered.contains("package-info.java"));
}

#[tokio::test]
async fn start_sends_backend_shaped_request() {
    let backend = ScriptedBackend::with_scripts(["alpha.script", "beta.script"]);
    let mut out = renderer();
    start_run(&backend, &mut out, &start_args("beta.script", "10", "fixed"))
        .await
        .expect("start");
    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::ListScripts,
            BackendCall::StartRun {
                script: "beta.script".to_owned(),
                duration_minutes: 10,
                fixed: true,
            }
        ]
    );
    assert!(output(out).contains("[success] Run started"));
}

#[tokio::test]
async fn invalid_start_makes_no_network_call() {
    let backend = ScriptedBackend::with_scripts(["alpha.script"]);
    let mut out = renderer();
    let err = start_run(&backend, &mut out, &start_args("alpha.script", "0", "Fixed"))
        .await
        .expect_err("non-positive duration");
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.to_string(), "Duration must be greater than 0.");

    let missing_mode = StartArgs {
        mode: None,
        ..start_args("alpha.script", "5", "")
    };
    let err = start_run(&backend, &mut out, &missing_mode)
        .await
        .expect_err("missing mode");
    assert_eq!(err.to_string(), "Please choose a window mode.");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn start_rejects_script_missing_from_catalog() {
    let backend = ScriptedBackend::with_scripts(["alpha.script"]);
    let mut out = renderer();
    let err = start_run(&backend, &mut out, &start_args("ghost.script", "5", "Resizable"))
        .await
        .expect_err("unknown script");
    assert!(matches!(
        err,
        CommandError::Validation(ValidationError::UnknownScript(_))
    ));
    assert_eq!(backend.count("api/runConfig"), 0);
}

#[tokio::test]
async fn failed_stop_is_a_runtime_error() {
    let backend = ScriptedBackend::new();
    backend.fail("api/stop");
    let mut out = renderer();
    let err = stop_run(&backend, &mut out).await.expect_err("stop fails");
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn status_reports_clamped_progress() {
    let backend = ScriptedBackend::new();
    backend.set_running(true);
    backend.set_progress(130);
    let mut out = renderer();
    show_status(&backend, &mut out, &ConsoleConfig::default())
        .await
        .expect("status");
    let rendered = output(out);
    assert!(rendered.contains("running: yes"));
    assert!(rendered.contains("progress: 100%"));
}

#[tokio::test]
async fn slider_is_clamped_then_previews_refresh() {
    let backend = ScriptedBackend::new();
    let mut out = renderer();
    send_slider(
        &backend,
        &mut out,
        &SliderArgs {
            channel: "hueMax".to_owned(),
            value: "400".to_owned(),
        },
    )
    .await
    .expect("slider");
    let calls = backend.calls();
    assert_eq!(
        calls[0],
        BackendCall::UpdateSlider(SliderUpdate {
            channel: SliderChannel::HueMax,
            value: 179,
        })
    );
    assert!(matches!(calls[1], BackendCall::FetchPreviews(_)));
    let rendered = output(out);
    assert!(rendered.contains("hueMax clamped to 179"));
    assert!(rendered.contains("original: 4 bytes"));
}

#[tokio::test]
async fn slider_rejects_unknown_channel() {
    let backend = ScriptedBackend::new();
    let mut out = renderer();
    let err = send_slider(
        &backend,
        &mut out,
        &SliderArgs {
            channel: "brightness".to_owned(),
            value: "3".to_owned(),
        },
    )
    .await
    .expect_err("unknown channel");
    assert_eq!(err.exit_code(), 2);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn colour_name_with_space_is_rejected_locally() {
    let backend = ScriptedBackend::new();
    let mut out = renderer();
    assert!(submit_colour(&backend, &mut out, "sky blue").await.is_err());
    submit_colour(&backend, &mut out, " teal ")
        .await
        .expect("submit");
    assert_eq!(
        backend.calls(),
        vec![BackendCall::SubmitColour("teal".to_owned())]
    );
}

#[test]
fn watch_printer_prints_only_unseen_snapshot_lines() {
    let mut printer = WatchPrinter::new(&ConsoleConfig::default());
    let mut out = renderer();
    let snapshot = |lines: &[&str]| {
        FeedEvent::Update(
            Topic::Logs,
            TopicUpdate::LogSnapshot(lines.iter().map(|line| (*line).to_owned()).collect()),
        )
    };
    printer
        .apply(snapshot(&["one", "two"]), &mut out)
        .expect("first");
    printer
        .apply(snapshot(&["one", "two", "three"]), &mut out)
        .expect("second");
    printer
        .apply(snapshot(&["two", "three"]), &mut out)
        .expect("third");
    assert_eq!(output(out), "one\ntwo\nthree\n");
}

#[test]
fn watch_printer_prints_each_line_once_when_retention_is_below_snapshot_size() {
    let config = ConsoleConfig {
        log_retention_lines: 3,
        ..ConsoleConfig::default()
    };
    let mut printer = WatchPrinter::new(&config);
    let mut out = renderer();
    let lines: Vec<String> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|line| (*line).to_owned())
        .collect();
    for _ in 0..3 {
        printer
            .apply(
                FeedEvent::Update(Topic::Logs, TopicUpdate::LogSnapshot(lines.clone())),
                &mut out,
            )
            .expect("snapshot");
    }
    assert_eq!(output(out), "a
b
c
d
e
");
}

#[test]
fn watch_printer_reports_state_and_progress_changes() {
    let mut printer = WatchPrinter::new(&ConsoleConfig::default());
    let mut out = renderer();
    for event in [
        FeedEvent::Update(Topic::State, TopicUpdate::Running(false)),
        FeedEvent::Update(Topic::State, TopicUpdate::Running(false)),
        FeedEvent::Update(Topic::Progress, TopicUpdate::Progress(20)),
        FeedEvent::Update(Topic::Progress, TopicUpdate::Progress(20)),
        FeedEvent::Update(Topic::State, TopicUpdate::Running(true)),
    ] {
        printer.apply(event, &mut out).expect("apply");
    }
    assert_eq!(
        output(out),
        "• info: run stopped\n• info: progress 20%\n• info: run running\n"
    );
}

#[tokio::test]
async fn watch_streams_pull_updates_until_stopped() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_log("hello");
    let config = ConsoleConfig {
        transport: crate::config::TransportMode::Pull,
        poll: crate::config::PollCadence {
            logs: Duration::from_millis(10),
            progress: Duration::from_millis(10),
            state: Duration::from_millis(10),
        },
        ..ConsoleConfig::default()
    };
    let mut out = renderer();
    watch(
        &config,
        backend.clone(),
        &mut out,
        tokio::time::sleep(Duration::from_millis(80)),
    )
    .await
    .expect("watch");
    let rendered = output(out);
    assert_eq!(rendered.matches("hello").count(), 1);
    assert!(rendered.contains("run stopped"));
}

#[tokio::test]
async fn rejected_slider_marks_the_step_failed_and_skips_previews() {
    let backend = ScriptedBackend::new();
    backend.fail("api/slider");
    let mut out = renderer();
    let err = send_slider(
        &backend,
        &mut out,
        &SliderArgs {
            channel: "satMin".to_owned(),
            value: "30".to_owned(),
        },
    )
    .await
    .expect_err("slider rejected");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(backend.count("api/originalImage"), 0);
    assert_eq!(output(out), "✕ satMin = 30\n");
}
