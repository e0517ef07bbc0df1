use super::{
    parse_command, parse_invocation, render_help, strip_global_flags, CliParseError, Command,
    ConsoleError, SliderArgs, StartArgs,
};
use crate::config::TransportMode;
use crate::ui::PlainRenderer;
use std::path::PathBuf;

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|arg| (*arg).to_owned()).collect()
}

#[test]
fn parse_defaults_to_console_without_command() {
    let cmd = parse_command(Vec::<String>::new()).expect("parse should succeed");
    assert_eq!(cmd, Command::Console);
}

#[test]
fn parse_help_flag_anywhere() {
    assert_eq!(parse_command(args(&["-h"])).expect("parse"), Command::Help);
    assert_eq!(
        parse_command(args(&["start", "--help"])).expect("parse"),
        Command::Help
    );
}

#[test]
fn parse_start_collects_raw_values() {
    let cmd = parse_command(args(&[
        "start",
        "--script",
        "beta.script",
        "--duration",
        "10",
        "-m",
        "Fixed",
    ]))
    .expect("parse should succeed");
    assert_eq!(
        cmd,
        Command::Start(StartArgs {
            script: Some("beta.script".to_owned()),
            duration: Some("10".to_owned()),
            mode: Some("Fixed".to_owned()),
        })
    );
}

#[test]
fn parse_start_leaves_missing_values_to_validation() {
    let cmd = parse_command(args(&["start", "--duration", "5"])).expect("parse");
    assert_eq!(
        cmd,
        Command::Start(StartArgs {
            duration: Some("5".to_owned()),
            ..StartArgs::default()
        })
    );
    let err = parse_command(args(&["start", "--script"])).expect_err("missing value");
    assert_eq!(err.to_string(), "--script requires a value");
}

#[test]
fn parse_slider_requires_channel_and_value() {
    assert_eq!(
        parse_command(args(&["slider", "hueMin", "30"])).expect("parse"),
        Command::Slider(SliderArgs {
            channel: "hueMin".to_owned(),
            value: "30".to_owned(),
        })
    );
    assert_eq!(
        parse_command(args(&["slider", "hueMin"])).expect_err("missing value"),
        CliParseError::MissingArgument("value")
    );
}

#[test]
fn parse_submit_colour_rejoins_words() {
    assert_eq!(
        parse_command(args(&["submit-colour", "sky", "blue"])).expect("parse"),
        Command::SubmitColour("sky blue".to_owned())
    );
    assert_eq!(
        parse_command(args(&["submit-colour"])).expect_err("missing"),
        CliParseError::MissingArgument("name")
    );
}

#[test]
fn parse_rejects_unknown_command_and_extra_args() {
    let err = parse_command(args(&["launch"])).expect_err("parse should fail");
    assert_eq!(err.to_string(), "unknown command: launch");
    let err = parse_command(args(&["status", "--verbose"])).expect_err("parse should fail");
    assert_eq!(err.to_string(), "unknown argument: --verbose");
}

#[test]
fn strip_global_flags_handles_any_position_and_inline_values() {
    let (rest, overrides) = strip_global_flags(args(&[
        "status",
        "--backend",
        "http://10.0.0.9:8080",
        "--transport=pull",
        "--config",
        "/tmp/scape.toml",
    ]))
    .expect("strip");
    assert_eq!(rest, args(&["status"]));
    assert_eq!(overrides.backend_url.as_deref(), Some("http://10.0.0.9:8080"));
    assert_eq!(overrides.transport, Some(TransportMode::Pull));
    assert_eq!(overrides.config_path, Some(PathBuf::from("/tmp/scape.toml")));
}

#[test]
fn strip_global_flags_reports_bad_transport() {
    let err = strip_global_flags(args(&["--transport", "smoke"])).expect_err("bad transport");
    assert_eq!(
        err.to_string(),
        "invalid transport `smoke` (expected push or pull)"
    );
    let err = strip_global_flags(args(&["watch", "--backend"])).expect_err("missing");
    assert_eq!(err, CliParseError::MissingValue("--backend"));
}

#[test]
fn invocation_combines_overrides_and_command() {
    let invocation =
        parse_invocation(args(&["--transport", "push", "watch"])).expect("parse");
    assert_eq!(invocation.command, Command::Watch);
    assert_eq!(invocation.overrides.transport, Some(TransportMode::Push));
}

#[test]
fn cli_errors_exit_with_two() {
    let err = ConsoleError::from(CliParseError::UnknownCommand("x".to_owned()));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.title(), "Invalid command arguments");
}

#[test]
fn render_help_writes_structured_sections() {
    let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);
    render_help(&mut renderer).expect("help render");
    let rendered = String::from_utf8(renderer.into_inner()).expect("utf8");
    assert!(rendered.contains("Commands"));
    assert!(rendered.contains("scape-console watch"));
    assert!(rendered.contains("scape-console submit-colour <name>"));
    assert!(rendered.contains("--transport <push|pull>"));
}
