use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::config::ConsoleConfig;
use crate::console::Console;
use crate::session::RunPhase;
use crate::sync::Topic;

pub(super) fn render_header(
    frame: &mut Frame<'_>,
    area: Rect,
    console: &Console,
    config: &ConsoleConfig,
) {
    let muted = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();
    for topic in Topic::ALL {
        let (status, color) = if console.link_up(topic) {
            ("up", Color::Green)
        } else {
            ("down", Color::Red)
        };
        spans.push(Span::styled("● ", Style::default().fg(color)));
        spans.push(Span::styled(
            format!("{} {status}  ", topic.name()),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::styled("|  ", muted));
    spans.push(Span::styled(
        format!("{} via {}", config.backend_url, config.transport.label()),
        muted,
    ));
    spans.push(Span::styled("  |  ", muted));
    let phase = console.session().run_state.phase();
    spans.push(Span::styled(
        format!("run: {}", phase.label()),
        phase_style(phase),
    ));

    let header = Paragraph::new(Line::from(spans)).block(panel_block(
        Some(" SCAPE CONSOLE "),
        true,
        Color::Magenta,
    ));
    frame.render_widget(header, area);
}

pub(super) fn phase_style(phase: RunPhase) -> Style {
    match phase {
        RunPhase::Running => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        RunPhase::Starting | RunPhase::Stopping => Style::default().fg(Color::Yellow),
        RunPhase::Stopped => Style::default().fg(Color::Gray),
    }
}

pub(super) fn panel_block<'a>(
    title: Option<&'a str>,
    show_version: bool,
    border_color: Color,
) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color));
    if let Some(title) = title {
        block = block.title_top(
            Line::from(Span::styled(
                title.to_owned(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .left_aligned(),
        );
    }
    if show_version {
        let version = format!(" v{} ", env!("CARGO_PKG_VERSION"));
        block = block.title_bottom(
            Line::from(Span::styled(
                version,
                Style::default().fg(Color::LightMagenta),
            ))
            .right_aligned(),
        );
    }
    block
}

/// Border colour for a pane, brighter when it has focus.
pub(super) fn focus_color(focused: bool) -> Color {
    if focused {
        Color::Magenta
    } else {
        Color::DarkGray
    }
}
