use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::config::ConsoleConfig;
use crate::console::Console;

use super::state::ViewState;

mod footer;
mod header;
mod overlays;
mod panes;
mod tuner;

use footer::render_footer;
use header::render_header;
use overlays::{render_alert, render_help_overlay};
use panes::{render_catalog, render_logs, render_progress, render_run_form};
use tuner::render_tuner;

const SIDE_COLUMN_WIDTH: u16 = 34;
const RUN_FORM_HEIGHT: u16 = 7;
const PROGRESS_HEIGHT: u16 = 3;

/// Screen regions for one frame. Shared by drawing and by the viewport
/// measurement so both always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PaneAreas {
    pub(super) header: Rect,
    pub(super) catalog: Rect,
    pub(super) run_form: Rect,
    pub(super) logs: Rect,
    pub(super) progress: Rect,
    pub(super) tuner: Rect,
    pub(super) footer: Rect,
}

pub(super) fn pane_areas(area: Rect) -> PaneAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDE_COLUMN_WIDTH),
            Constraint::Min(10),
            Constraint::Length(SIDE_COLUMN_WIDTH),
        ])
        .split(rows[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(RUN_FORM_HEIGHT)])
        .split(columns[0]);
    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(PROGRESS_HEIGHT)])
        .split(columns[1]);
    PaneAreas {
        header: rows[0],
        catalog: left[0],
        run_form: left[1],
        logs: middle[0],
        progress: middle[1],
        tuner: columns[2],
        footer: rows[2],
    }
}

/// Text rows available inside the bordered log pane.
pub(super) fn log_viewport_rows(area: Rect) -> usize {
    usize::from(pane_areas(area).logs.height.saturating_sub(2)).max(1)
}

pub(super) fn render_ui(
    frame: &mut Frame<'_>,
    console: &Console,
    view: &ViewState,
    config: &ConsoleConfig,
) {
    let areas = pane_areas(frame.area());
    let session = console.session();

    render_header(frame, areas.header, console, config);
    render_catalog(frame, areas.catalog, session, view);
    render_run_form(frame, areas.run_form, session, view);
    render_logs(frame, areas.logs, session, view);
    render_progress(frame, areas.progress, session);
    render_tuner(frame, areas.tuner, session, view);
    render_footer(frame, areas.footer, session, view);

    if view.show_help {
        render_help_overlay(frame);
    }
    if let Some(message) = session.alert() {
        render_alert(frame, message);
    }
}
