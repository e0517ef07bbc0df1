pub mod backend;
pub mod commands;
pub mod config;
pub mod console;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod sync;
pub mod testing;
pub mod tui;
pub mod ui;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::commands::CommandError;
use crate::config::{ConfigError, ConfigOverrides, TransportMode};
use crate::tui::TuiError;
use crate::ui::{KeyValue, Renderer, TableSpec, UiResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Console,
    Scripts,
    Start(StartArgs),
    Stop,
    Status,
    Watch,
    Slider(SliderArgs),
    SubmitColour(String),
    Help,
}

/// Raw start parameters; validated by the run configuration builder so the
/// CLI and the console report identical messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartArgs {
    pub script: Option<String>,
    pub duration: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderArgs {
    pub channel: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub overrides: ConfigOverrides,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliParseError {
    MissingValue(&'static str),
    MissingArgument(&'static str),
    InvalidTransport(String),
    UnknownArgument(String),
    UnknownCommand(String),
}

impl Display for CliParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliParseError::MissingValue(flag) => write!(f, "{flag} requires a value"),
            CliParseError::MissingArgument(name) => write!(f, "missing required argument <{name}>"),
            CliParseError::InvalidTransport(raw) => {
                write!(f, "invalid transport `{raw}` (expected push or pull)")
            }
            CliParseError::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
            CliParseError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
        }
    }
}

impl std::error::Error for CliParseError {}

/// Top-level failure of the binary.
#[derive(Debug)]
pub enum ConsoleError {
    Cli(CliParseError),
    Config(ConfigError),
    Command(CommandError),
    Terminal(std::io::Error),
}

impl ConsoleError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ConsoleError::Cli(_) => 2,
            ConsoleError::Command(error) => error.exit_code(),
            ConsoleError::Config(_) | ConsoleError::Terminal(_) => 1,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ConsoleError::Cli(_) => "Invalid command arguments",
            ConsoleError::Config(_) => "Configuration error",
            ConsoleError::Command(error) => error.title(),
            ConsoleError::Terminal(_) => "Terminal error",
        }
    }
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleError::Cli(error) => write!(f, "{error}"),
            ConsoleError::Config(error) => write!(f, "{error}"),
            ConsoleError::Command(error) => write!(f, "{error}"),
            ConsoleError::Terminal(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<CliParseError> for ConsoleError {
    fn from(value: CliParseError) -> Self {
        Self::Cli(value)
    }
}

impl From<ConfigError> for ConsoleError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<CommandError> for ConsoleError {
    fn from(value: CommandError) -> Self {
        Self::Command(value)
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(value: std::io::Error) -> Self {
        Self::Terminal(value)
    }
}

impl From<TuiError> for ConsoleError {
    fn from(value: TuiError) -> Self {
        match value {
            TuiError::Io(error) => Self::Terminal(error),
            TuiError::Backend(error) => Self::Command(CommandError::Backend(error)),
        }
    }
}

/// Removes `--backend`, `--transport` and `--config` wherever they appear
/// and returns the remaining arguments.
pub fn strip_global_flags<I>(args: I) -> Result<(Vec<String>, ConfigOverrides), CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut rest = Vec::new();
    let mut overrides = ConfigOverrides::default();
    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_owned(), Some(value.to_owned())),
            _ => (arg.clone(), None),
        };
        let flag_name: &'static str = match flag.as_str() {
            "--backend" => "--backend",
            "--transport" => "--transport",
            "--config" => "--config",
            _ => {
                rest.push(arg);
                continue;
            }
        };
        let Some(value) = inline.or_else(|| args.next()) else {
            return Err(CliParseError::MissingValue(flag_name));
        };
        match flag_name {
            "--backend" => overrides.backend_url = Some(value),
            "--transport" => {
                let transport = value
                    .parse::<TransportMode>()
                    .map_err(|_| CliParseError::InvalidTransport(value.clone()))?;
                overrides.transport = Some(transport);
            }
            _ => overrides.config_path = Some(PathBuf::from(value)),
        }
    }
    Ok((rest, overrides))
}

pub fn parse_invocation<I>(args: I) -> Result<Invocation, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let (rest, overrides) = strip_global_flags(args)?;
    Ok(Invocation {
        overrides,
        command: parse_command(rest)?,
    })
}

pub fn parse_command<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(Command::Console);
    };
    if args_request_help(&cmd) {
        return Ok(Command::Help);
    }
    let rest: Vec<String> = args.collect();
    if rest.iter().any(|arg| args_request_help(arg)) {
        return Ok(Command::Help);
    }

    match cmd.as_str() {
        "console" | "tui" => no_extra_args(rest, Command::Console),
        "help" => Ok(Command::Help),
        "scripts" => no_extra_args(rest, Command::Scripts),
        "stop" => no_extra_args(rest, Command::Stop),
        "status" => no_extra_args(rest, Command::Status),
        "watch" => no_extra_args(rest, Command::Watch),
        "start" => parse_start(rest),
        "slider" => parse_slider(rest),
        "submit-colour" | "submit-color" => parse_submit_colour(rest),
        other if other.starts_with('-') => Err(CliParseError::UnknownArgument(other.to_owned())),
        other => Err(CliParseError::UnknownCommand(other.to_owned())),
    }
}

fn args_request_help(arg: &str) -> bool {
    arg == "--help" || arg == "-h"
}

fn no_extra_args(rest: Vec<String>, command: Command) -> Result<Command, CliParseError> {
    match rest.into_iter().next() {
        Some(extra) => Err(CliParseError::UnknownArgument(extra)),
        None => Ok(command),
    }
}

fn parse_start(rest: Vec<String>) -> Result<Command, CliParseError> {
    let mut args = rest.into_iter();
    let mut start = StartArgs::default();
    while let Some(arg) = args.next() {
        let (slot, flag) = match arg.as_str() {
            "--script" | "-s" => (&mut start.script, "--script"),
            "--duration" | "-d" => (&mut start.duration, "--duration"),
            "--mode" | "-m" => (&mut start.mode, "--mode"),
            other => return Err(CliParseError::UnknownArgument(other.to_owned())),
        };
        let Some(value) = args.next() else {
            return Err(CliParseError::MissingValue(flag));
        };
        *slot = Some(value);
    }
    Ok(Command::Start(start))
}

fn parse_slider(rest: Vec<String>) -> Result<Command, CliParseError> {
    let mut args = rest.into_iter();
    let Some(channel) = args.next() else {
        return Err(CliParseError::MissingArgument("channel"));
    };
    let Some(value) = args.next() else {
        return Err(CliParseError::MissingArgument("value"));
    };
    no_extra_args(args.collect(), Command::Slider(SliderArgs { channel, value }))
}

fn parse_submit_colour(rest: Vec<String>) -> Result<Command, CliParseError> {
    if rest.is_empty() {
        return Err(CliParseError::MissingArgument("name"));
    }
    // Unquoted words are rejoined; whitespace is rejected by validation.
    Ok(Command::SubmitColour(rest.join(" ")))
}

pub fn render_help<R: Renderer>(renderer: &mut R) -> UiResult<()> {
    renderer.section("scape-console")?;
    renderer.text("Operator console for the colour-driven automation backend.\n")?;
    renderer.section("Commands")?;
    let rows = [
        ("scape-console [console]", "Interactive terminal console (default)"),
        ("scape-console scripts", "List runnable scripts"),
        (
            "scape-console start --script <ID> --duration <MIN> --mode <Fixed|Resizable>",
            "Validate and start a run",
        ),
        ("scape-console stop", "Stop the current run"),
        ("scape-console status", "Show running state and progress once"),
        ("scape-console watch", "Stream logs, progress and state until Ctrl-C"),
        (
            "scape-console slider <channel> <value>",
            "Send one slider value (hueMin satMin valMin hueMax satMax valMax)",
        ),
        ("scape-console submit-colour <name>", "Save the current ranges under a name"),
    ]
    .into_iter()
    .map(|(usage, about)| vec![usage.to_owned(), about.to_owned()])
    .collect();
    renderer.table(&TableSpec::new(Vec::new(), rows))?;
    renderer.section("Global Options")?;
    renderer.key_values(&[
        KeyValue::new("--backend <URL>", "Backend address (env SCAPE_BACKEND_URL)"),
        KeyValue::new("--transport <push|pull>", "Topic transport (env SCAPE_TRANSPORT)"),
        KeyValue::new("--config <PATH>", "Config file (default ./scape-console.toml)"),
        KeyValue::new("-h, --help", "Print help"),
    ])?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
