use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::session::{ConsoleSession, NoticeLevel};

use super::super::state::{InputMode, ViewState};

pub(super) fn render_footer(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &ConsoleSession,
    view: &ViewState,
) {
    let muted = Style::default().fg(Color::DarkGray);
    let active = Style::default().fg(Color::Yellow);

    let spans = if view.input_mode == InputMode::ColourName {
        vec![
            Span::styled("colour name: ", active),
            Span::styled(view.colour_input.clone(), Style::default().fg(Color::Gray)),
            Span::styled("▏", active),
            Span::styled("  (enter save, esc cancel)", muted),
        ]
    } else {
        let mut spans = vec![
            Span::styled("tab focus", muted),
            Span::styled("  |  ", muted),
            Span::styled("s start/stop", muted),
            Span::styled("  |  ", muted),
            Span::styled("c save colour", muted),
            Span::styled("  |  ", muted),
            Span::styled("help (?)", if view.show_help { active } else { muted }),
        ];
        if let Some(notice) = session.latest_notice() {
            spans.push(Span::styled("  |  ", muted));
            spans.push(Span::styled(
                notice.text.clone(),
                Style::default().fg(notice_color(notice.level)),
            ));
        }
        spans
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Gray,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}
