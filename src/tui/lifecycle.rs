use std::io;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub(super) type TuiTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub(super) fn init_terminal() -> Result<TuiTerminal, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error);
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Leaves raw mode and the alternate screen. Every step is attempted even
/// when an earlier one fails; the first failure is reported.
pub(super) fn restore_terminal(terminal: &mut TuiTerminal) -> Result<(), io::Error> {
    let raw = disable_raw_mode();
    let screen = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        EnableLineWrap
    );
    let cursor = terminal.show_cursor();
    raw.and(screen).and(cursor)
}
