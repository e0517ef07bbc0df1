use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Gauge, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use crate::session::{ConsoleSession, WindowMode};

use super::super::state::{Focus, ViewState};
use super::header::{focus_color, panel_block, phase_style};

pub(super) fn render_catalog(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &ConsoleSession,
    view: &ViewState,
) {
    let block = panel_block(
        Some(" Scripts "),
        false,
        focus_color(view.focus == Focus::Catalog),
    );
    let catalog = &session.catalog;
    if catalog.entries().is_empty() {
        let text = if catalog.is_loaded() {
            "no runnable scripts"
        } else {
            "loading scripts... (r to retry)"
        };
        let placeholder = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items = catalog
        .entries()
        .iter()
        .map(|entry| ListItem::new(entry.name.clone()))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(catalog.selected_index());
    frame.render_stateful_widget(list, area, &mut state);
}

pub(super) fn render_run_form(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &ConsoleSession,
    view: &ViewState,
) {
    let focused = view.focus == Focus::RunForm;
    let muted = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Gray);
    let active = Style::default().fg(Color::Yellow);

    let script = session
        .catalog
        .selected()
        .map(|entry| entry.name.clone())
        .unwrap_or_else(|| "-".to_owned());
    let mut duration = vec![
        Span::styled("duration: ", muted),
        Span::styled(session.draft.duration_input.clone(), value),
    ];
    if focused {
        duration.push(Span::styled("▏", active));
    }
    duration.push(Span::styled(" min", muted));

    let mut window = vec![Span::styled("window: ", muted)];
    for mode in WindowMode::ALL {
        let style = if session.draft.window_mode == Some(mode) {
            active.add_modifier(Modifier::BOLD)
        } else {
            muted
        };
        window.push(Span::styled(format!("{} ", mode.label()), style));
    }

    let run_state = &session.run_state;
    let toggle = match run_state.in_flight() {
        Some(_) => Span::styled(
            format!("[ {}... ]", capitalize(run_state.phase().label())),
            Style::default().fg(Color::DarkGray),
        ),
        None => Span::styled(
            format!("[ {} ]", run_state.toggle_label()),
            phase_style(run_state.phase()).add_modifier(Modifier::REVERSED),
        ),
    };

    let lines = vec![
        Line::from(vec![Span::styled("script: ", muted), Span::styled(script, value)]),
        Line::from(duration),
        Line::from(window),
        Line::from(""),
        Line::from(vec![toggle, Span::styled("  (s)", muted)]),
    ];
    let form = Paragraph::new(lines).block(panel_block(Some(" Run "), false, focus_color(focused)));
    frame.render_widget(form, area);
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(super) fn render_logs(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &ConsoleSession,
    view: &ViewState,
) {
    let logs = &session.logs;
    let title = if logs.is_near_bottom() {
        " Logs [follow] "
    } else {
        " Logs [scrolled] "
    };
    let block = panel_block(Some(title), false, focus_color(view.focus == Focus::Logs));
    let lines = logs
        .visible()
        .map(|line| Line::from(line.to_owned()))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if logs.max_offset() > 0 {
        let mut scrollbar_state = ScrollbarState::new(logs.len())
            .viewport_content_length(logs.viewport_rows())
            .position(logs.offset());
        frame.render_stateful_widget(
            Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

pub(super) fn render_progress(frame: &mut Frame<'_>, area: Rect, session: &ConsoleSession) {
    let progress = session.progress;
    let gauge = Gauge::default()
        .block(panel_block(Some(" Progress "), false, Color::DarkGray))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .percent(u16::from(progress.percent()))
        .label(progress.label());
    frame.render_widget(gauge, area);
}
