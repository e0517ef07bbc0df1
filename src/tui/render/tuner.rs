use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::session::{ConsoleSession, SliderChannel};

use super::super::state::{Focus, ViewState};
use super::header::{focus_color, panel_block};

const BAR_WIDTH: u16 = 12;

pub(super) fn render_tuner(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &ConsoleSession,
    view: &ViewState,
) {
    let focused = view.focus == Focus::Tuner;
    let muted = Style::default().fg(Color::DarkGray);
    let tuner = &session.tuner;

    let mut lines = SliderChannel::ALL
        .into_iter()
        .map(|channel| {
            let selected = focused && channel == view.selected_slider();
            let value = tuner.state().get(channel);
            let filled = bar_fill(value, channel.max_value());
            let pending = if tuner.is_pending(channel) { "*" } else { " " };
            let label_style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(if selected { "› " } else { "  " }, label_style),
                Span::styled(format!("{:<7}", channel.id()), label_style),
                Span::styled(
                    "█".repeat(usize::from(filled)),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled("░".repeat(usize::from(BAR_WIDTH - filled)), muted),
                Span::styled(format!(" {value:>3}{pending}"), label_style),
            ])
        })
        .collect::<Vec<_>>();

    let previews = tuner.previews();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        match previews.token {
            Some(token) => format!("previews t={token}"),
            None => "previews: not loaded".to_owned(),
        },
        muted,
    )));
    lines.push(Line::from(format!(
        "  original {} B",
        previews.original_bytes
    )));
    lines.push(Line::from(format!(
        "  modified {} B",
        previews.modified_bytes
    )));
    lines.push(Line::from(Span::styled(
        format!("  refreshed {}x (p)", previews.refreshes),
        muted,
    )));

    let panel = Paragraph::new(lines).block(panel_block(
        Some(" Colour Ranges "),
        false,
        focus_color(focused),
    ));
    frame.render_widget(panel, area);
}

fn bar_fill(value: u16, max: u16) -> u16 {
    if max == 0 {
        return 0;
    }
    ((u32::from(value.min(max)) * u32::from(BAR_WIDTH)) / u32::from(max)) as u16
}
