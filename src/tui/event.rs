use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

/// TUI-specific input events. Which step they apply to is decided in the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    // Global
    ForceQuit, // Ctrl+C
    Resize,

    // Editing
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Newline,
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,

    // Commands
    Submit,      // Ctrl+D, Ctrl+Enter
    Save,        // Ctrl+S
    CycleEffort, // Ctrl+R
    Escape,
    PageUp,
    PageDown,
    ScrollUp,
    ScrollDown,

    /// Left click at (column, row).
    MouseClick(u16, u16),
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Waits up to `timeout` for the next event the TUI cares about.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(event) => map_event(event),
        Err(e) => {
            log::warn!("Event read failed: {}", e);
            None
        }
    }
}

pub fn map_event(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                Some(TuiEvent::MouseClick(mouse.column, mouse.row))
            }
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<TuiEvent> {
    // Keyboard enhancement reports releases too
    if key.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(TuiEvent::ForceQuit),
        KeyCode::Char('d') if ctrl => Some(TuiEvent::Submit),
        // ASCII LF; Ctrl+Enter sends this in most terminals
        KeyCode::Char('j') if ctrl => Some(TuiEvent::Submit),
        KeyCode::Char('s') if ctrl => Some(TuiEvent::Save),
        KeyCode::Char('r') if ctrl => Some(TuiEvent::CycleEffort),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter if ctrl || alt => Some(TuiEvent::Submit),
        KeyCode::Enter => Some(TuiEvent::Newline),
        KeyCode::Tab => Some(TuiEvent::InputChar('\t')),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::PageUp => Some(TuiEvent::PageUp),
        KeyCode::PageDown => Some(TuiEvent::PageDown),
        KeyCode::Esc => Some(TuiEvent::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    macro_rules! key_tests {
        ($($name:ident: $code:expr, $mods:expr => $expected:expr;)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(map_event(key($code, $mods)), $expected);
                }
            )*
        };
    }

    key_tests! {
        ctrl_c_force_quits: KeyCode::Char('c'), KeyModifiers::CONTROL => Some(TuiEvent::ForceQuit);
        ctrl_d_submits: KeyCode::Char('d'), KeyModifiers::CONTROL => Some(TuiEvent::Submit);
        ctrl_j_submits: KeyCode::Char('j'), KeyModifiers::CONTROL => Some(TuiEvent::Submit);
        ctrl_enter_submits: KeyCode::Enter, KeyModifiers::CONTROL => Some(TuiEvent::Submit);
        alt_enter_submits: KeyCode::Enter, KeyModifiers::ALT => Some(TuiEvent::Submit);
        enter_is_newline: KeyCode::Enter, KeyModifiers::NONE => Some(TuiEvent::Newline);
        ctrl_s_saves: KeyCode::Char('s'), KeyModifiers::CONTROL => Some(TuiEvent::Save);
        ctrl_r_cycles_effort: KeyCode::Char('r'), KeyModifiers::CONTROL => Some(TuiEvent::CycleEffort);
        unbound_ctrl_is_ignored: KeyCode::Char('x'), KeyModifiers::CONTROL => None;
        plain_char: KeyCode::Char('r'), KeyModifiers::NONE => Some(TuiEvent::InputChar('r'));
        shifted_char: KeyCode::Char('R'), KeyModifiers::SHIFT => Some(TuiEvent::InputChar('R'));
        wide_char: KeyCode::Char('高'), KeyModifiers::NONE => Some(TuiEvent::InputChar('高'));
        escape: KeyCode::Esc, KeyModifiers::NONE => Some(TuiEvent::Escape);
        left_arrow: KeyCode::Left, KeyModifiers::NONE => Some(TuiEvent::CursorLeft);
        page_down: KeyCode::PageDown, KeyModifiers::NONE => Some(TuiEvent::PageDown);
        function_key_ignored: KeyCode::F(5), KeyModifiers::NONE => None;
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_event(Event::Key(release)), None);
    }

    #[test]
    fn test_left_click_reports_position() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(map_event(Event::Mouse(click)), Some(TuiEvent::MouseClick(12, 3)));
    }

    #[test]
    fn test_paste_and_resize() {
        assert_eq!(
            map_event(Event::Paste("a\nb".to_string())),
            Some(TuiEvent::Paste("a\nb".to_string()))
        );
        assert_eq!(map_event(Event::Resize(80, 24)), Some(TuiEvent::Resize));
    }
}
