use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::console::OperatorAction;
use crate::session::{ConsoleSession, ScrollAction, WindowMode};

use super::config::SLIDER_COARSE_STEP;
use super::state::{Focus, InputMode, ViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum LoopControl {
    Continue(Vec<OperatorAction>),
    Quit,
}

impl LoopControl {
    fn none() -> Self {
        LoopControl::Continue(Vec::new())
    }

    fn one(action: OperatorAction) -> Self {
        LoopControl::Continue(vec![action])
    }
}

/// Translates one key press into operator actions. View-only changes
/// (focus, help, prompt text) are applied to `view` directly.
pub(super) fn handle_key(
    key: KeyEvent,
    view: &mut ViewState,
    session: &ConsoleSession,
) -> LoopControl {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return LoopControl::Quit;
    }
    if session.alert().is_some() {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                LoopControl::one(OperatorAction::DismissAlert)
            }
            _ => LoopControl::none(),
        };
    }
    if view.input_mode == InputMode::ColourName {
        return colour_prompt_key(key, view);
    }
    if view.show_help {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            view.show_help = false;
        }
        return LoopControl::none();
    }

    match key.code {
        KeyCode::Char('q') => return LoopControl::Quit,
        KeyCode::Char('?') => {
            view.show_help = true;
            return LoopControl::none();
        }
        KeyCode::Tab => {
            view.focus = view.focus.next();
            return LoopControl::none();
        }
        KeyCode::BackTab => {
            view.focus = view.focus.prev();
            return LoopControl::none();
        }
        KeyCode::Char('s') | KeyCode::F(5) => return LoopControl::one(OperatorAction::ToggleRun),
        KeyCode::Char('c') => {
            view.begin_colour_input();
            return LoopControl::none();
        }
        KeyCode::Char('p') => return LoopControl::one(OperatorAction::RefreshPreviews),
        _ => {}
    }

    match view.focus {
        Focus::Catalog => catalog_key(key, view),
        Focus::RunForm => run_form_key(key),
        Focus::Logs => logs_key(key),
        Focus::Tuner => tuner_key(key, view),
    }
}

fn colour_prompt_key(key: KeyEvent, view: &mut ViewState) -> LoopControl {
    match key.code {
        KeyCode::Esc => {
            view.take_colour_input();
            LoopControl::none()
        }
        KeyCode::Enter => LoopControl::one(OperatorAction::SubmitColour(view.take_colour_input())),
        KeyCode::Backspace => {
            view.colour_input.pop();
            LoopControl::none()
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view.push_colour_char(ch);
            LoopControl::none()
        }
        _ => LoopControl::none(),
    }
}

fn catalog_key(key: KeyEvent, view: &mut ViewState) -> LoopControl {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => LoopControl::one(OperatorAction::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => LoopControl::one(OperatorAction::SelectNext),
        KeyCode::Char('r') => LoopControl::one(OperatorAction::ReloadScripts),
        KeyCode::Enter => {
            view.focus = Focus::RunForm;
            LoopControl::none()
        }
        _ => LoopControl::none(),
    }
}

fn run_form_key(key: KeyEvent) -> LoopControl {
    match key.code {
        KeyCode::Char(ch) if ch.is_ascii_digit() || ch == '-' => {
            LoopControl::one(OperatorAction::DurationChar(ch))
        }
        KeyCode::Backspace => LoopControl::one(OperatorAction::DurationBackspace),
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('m') => {
            LoopControl::one(OperatorAction::CycleWindowMode)
        }
        KeyCode::Char('f') => LoopControl::one(OperatorAction::SetWindowMode(WindowMode::Fixed)),
        KeyCode::Char('r') => {
            LoopControl::one(OperatorAction::SetWindowMode(WindowMode::Resizable))
        }
        KeyCode::Enter => LoopControl::one(OperatorAction::ToggleRun),
        _ => LoopControl::none(),
    }
}

fn logs_key(key: KeyEvent) -> LoopControl {
    let scroll = match key.code {
        KeyCode::Up | KeyCode::Char('k') => ScrollAction::LineUp,
        KeyCode::Down | KeyCode::Char('j') => ScrollAction::LineDown,
        KeyCode::PageUp => ScrollAction::PageUp,
        KeyCode::PageDown => ScrollAction::PageDown,
        KeyCode::Home | KeyCode::Char('g') => ScrollAction::Top,
        KeyCode::End | KeyCode::Char('G') => ScrollAction::Bottom,
        _ => return LoopControl::none(),
    };
    LoopControl::one(OperatorAction::Scroll(scroll))
}

fn tuner_key(key: KeyEvent, view: &mut ViewState) -> LoopControl {
    let channel = view.selected_slider();
    let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
        SLIDER_COARSE_STEP
    } else {
        1
    };
    let delta = match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view.prev_slider();
            return LoopControl::none();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view.next_slider();
            return LoopControl::none();
        }
        KeyCode::Left | KeyCode::Char('h') => -step,
        KeyCode::Right | KeyCode::Char('l') => step,
        KeyCode::PageDown => -SLIDER_COARSE_STEP,
        KeyCode::PageUp => SLIDER_COARSE_STEP,
        KeyCode::Home => return LoopControl::one(OperatorAction::SetSlider { channel, value: 0 }),
        KeyCode::End => {
            return LoopControl::one(OperatorAction::SetSlider {
                channel,
                value: i64::from(channel.max_value()),
            })
        }
        _ => return LoopControl::none(),
    };
    LoopControl::one(OperatorAction::NudgeSlider { channel, delta })
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::session::SliderChannel;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn actions(control: LoopControl) -> Vec<OperatorAction> {
        match control {
            LoopControl::Continue(actions) => actions,
            LoopControl::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn ctrl_c_quits_even_while_typing_a_colour() {
        let mut view = ViewState::default();
        view.begin_colour_input();
        let session = ConsoleSession::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(key, &mut view, &session), LoopControl::Quit);
    }

    #[test]
    fn alert_swallows_keys_until_dismissed() {
        let mut view = ViewState::default();
        let mut session = ConsoleSession::default();
        session.raise_alert("Please select a script.");
        assert!(actions(handle_key(press(KeyCode::Char('s')), &mut view, &session)).is_empty());
        assert_eq!(
            actions(handle_key(press(KeyCode::Enter), &mut view, &session)),
            vec![OperatorAction::DismissAlert]
        );
    }

    #[test]
    fn tab_cycles_focus_and_keys_follow_focus() {
        let mut view = ViewState::default();
        let session = ConsoleSession::default();
        assert_eq!(
            actions(handle_key(press(KeyCode::Down), &mut view, &session)),
            vec![OperatorAction::SelectNext]
        );

        handle_key(press(KeyCode::Tab), &mut view, &session);
        assert_eq!(view.focus, Focus::RunForm);
        assert_eq!(
            actions(handle_key(press(KeyCode::Char('7')), &mut view, &session)),
            vec![OperatorAction::DurationChar('7')]
        );
        assert_eq!(
            actions(handle_key(press(KeyCode::Char('f')), &mut view, &session)),
            vec![OperatorAction::SetWindowMode(WindowMode::Fixed)]
        );

        handle_key(press(KeyCode::Tab), &mut view, &session);
        assert_eq!(
            actions(handle_key(press(KeyCode::End), &mut view, &session)),
            vec![OperatorAction::Scroll(ScrollAction::Bottom)]
        );

        handle_key(press(KeyCode::BackTab), &mut view, &session);
        assert_eq!(view.focus, Focus::RunForm);
    }

    #[test]
    fn tuner_keys_nudge_the_selected_channel() {
        let mut view = ViewState {
            focus: Focus::Tuner,
            ..ViewState::default()
        };
        let session = ConsoleSession::default();
        handle_key(press(KeyCode::Down), &mut view, &session);
        assert_eq!(view.selected_slider(), SliderChannel::SatMin);
        assert_eq!(
            actions(handle_key(
                KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT),
                &mut view,
                &session
            )),
            vec![OperatorAction::NudgeSlider {
                channel: SliderChannel::SatMin,
                delta: 10,
            }]
        );
        assert_eq!(
            actions(handle_key(press(KeyCode::End), &mut view, &session)),
            vec![OperatorAction::SetSlider {
                channel: SliderChannel::SatMin,
                value: 255,
            }]
        );
        handle_key(press(KeyCode::Up), &mut view, &session);
        handle_key(press(KeyCode::Up), &mut view, &session);
        assert_eq!(view.selected_slider(), SliderChannel::ValMax);
    }

    #[test]
    fn colour_prompt_collects_text_then_submits() {
        let mut view = ViewState::default();
        let session = ConsoleSession::default();
        handle_key(press(KeyCode::Char('c')), &mut view, &session);
        assert_eq!(view.input_mode, InputMode::ColourName);
        for ch in "teal".chars() {
            handle_key(press(KeyCode::Char(ch)), &mut view, &session);
        }
        // 'q' is text here, not quit.
        handle_key(press(KeyCode::Char('q')), &mut view, &session);
        handle_key(press(KeyCode::Backspace), &mut view, &session);
        assert_eq!(
            actions(handle_key(press(KeyCode::Enter), &mut view, &session)),
            vec![OperatorAction::SubmitColour("teal".to_owned())]
        );
        assert_eq!(view.input_mode, InputMode::Command);
        assert!(view.colour_input.is_empty());
    }

    #[test]
    fn help_overlay_blocks_actions_until_closed() {
        let mut view = ViewState::default();
        let session = ConsoleSession::default();
        handle_key(press(KeyCode::Char('?')), &mut view, &session);
        assert!(view.show_help);
        assert!(actions(handle_key(press(KeyCode::Char('s')), &mut view, &session)).is_empty());
        handle_key(press(KeyCode::Esc), &mut view, &session);
        assert!(!view.show_help);
        assert_eq!(
            actions(handle_key(press(KeyCode::Char('s')), &mut view, &session)),
            vec![OperatorAction::ToggleRun]
        );
    }
}
