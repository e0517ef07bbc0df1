use std::sync::Arc;

use scape_console::backend::{Backend, HttpBackend};
use scape_console::config::{ConfigOverrides, ConsoleConfig};
use scape_console::logging::{self, LogTarget};
use scape_console::ui::{MessageBlock, OutputMode, PlainRenderer, Renderer};
use scape_console::{commands, parse_invocation, render_help, Command, ConsoleError};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output_mode = OutputMode::from_env();
    let invocation = match parse_invocation(args) {
        Ok(invocation) => invocation,
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(
                &MessageBlock::new("Invalid command arguments", err.to_string())
                    .with_hint("Run `scape-console --help` to see supported command forms"),
            );
            let _ = render_help(&mut PlainRenderer::stdout(output_mode));
            std::process::exit(2);
        }
    };

    if invocation.command == Command::Help {
        let _ = render_help(&mut PlainRenderer::stdout(output_mode));
        return;
    }

    if let Err(err) = run(invocation.command, &invocation.overrides, output_mode).await {
        let mut renderer = PlainRenderer::stderr(output_mode);
        let _ = renderer.error_block(&MessageBlock::new(err.title(), err.to_string()));
        std::process::exit(err.exit_code());
    }
}

async fn run(
    command: Command,
    overrides: &ConfigOverrides,
    output_mode: OutputMode,
) -> Result<(), ConsoleError> {
    let config = ConsoleConfig::resolve(overrides)?;
    let target = if command == Command::Console {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    logging::init(target)?;

    let backend =
        Arc::new(HttpBackend::new(&config.backend_url).map_err(commands::CommandError::from)?);
    let mut out = PlainRenderer::stdout(output_mode);
    match command {
        Command::Console => {
            scape_console::tui::run_console(&config, backend).await?;
        }
        Command::Scripts => commands::list_scripts(backend.as_ref(), &mut out).await?,
        Command::Start(args) => commands::start_run(backend.as_ref(), &mut out, &args).await?,
        Command::Stop => commands::stop_run(backend.as_ref(), &mut out).await?,
        Command::Status => commands::show_status(backend.as_ref(), &mut out, &config).await?,
        Command::Watch => {
            let shared: Arc<dyn Backend> = backend;
            commands::watch(&config, shared, &mut out, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
        }
        Command::Slider(args) => commands::send_slider(backend.as_ref(), &mut out, &args).await?,
        Command::SubmitColour(name) => {
            commands::submit_colour(backend.as_ref(), &mut out, &name).await?
        }
        Command::Help => render_help(&mut out).map_err(commands::CommandError::from)?,
    }
    Ok(())
}
