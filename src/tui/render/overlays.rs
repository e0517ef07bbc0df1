use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::header::panel_block;

const HELP_SECTIONS: [(&str, &[&str]); 5] = [
    (
        "Global",
        &[
            "tab / shift+tab  move focus between panes",
            "s / F5           start or stop the selected run",
            "c                save the current ranges as a colour",
            "p                refresh preview images",
            "?                toggle this help",
            "q / ctrl+c       quit",
        ],
    ),
    (
        "Scripts",
        &[
            "up/down          move selection",
            "r                retry loading the catalog",
            "enter            edit the run form",
        ],
    ),
    (
        "Run",
        &[
            "0-9, backspace   edit duration (minutes)",
            "f / r            fixed or resizable window",
            "space, left/right cycle window mode",
            "enter            start or stop",
        ],
    ),
    (
        "Logs",
        &[
            "up/down pgup/pgdn scroll",
            "home / end       jump to top or bottom (end follows)",
        ],
    ),
    (
        "Colour Ranges",
        &[
            "up/down          choose slider",
            "left/right       adjust by 1 (shift: 10)",
            "home / end       minimum or maximum",
        ],
    ),
];

pub(super) fn render_help_overlay(frame: &mut Frame<'_>) {
    let area = centered_rect(64, 80, frame.area());
    let heading = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    for (idx, (title, rows)) in HELP_SECTIONS.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(*title, heading)));
        lines.extend(rows.iter().map(|row| Line::from(*row)));
    }
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(panel_block(Some(" Help "), false, Color::Magenta)),
        area,
    );
}

pub(super) fn render_alert(frame: &mut Frame<'_>, message: &str) {
    let area = centered_rect(60, 30, frame.area());
    let lines = vec![
        Line::from(Span::styled(
            message.to_owned(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "enter / esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel_block(Some(" Cannot continue "), false, Color::Red)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
