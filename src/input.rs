use crate::state::TransformState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Fixed change applied by every nudge key
pub const STEP: f64 = 0.1;
/// Value the middle numeric-pad column resets a color channel to
pub const COLOR_RESET: f64 = 0.5;

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

/// Keys the transform dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    /// Numeric-pad digit 1..=9
    Numpad(u8),
    /// Lowercase letter
    Letter(char),
}

impl Key {
    /// Maps a terminal key event. Digits count as numeric-pad keys since
    /// terminals do not reliably report the keypad; keys chorded with
    /// Ctrl or Alt are not transform keys.
    pub fn from_event(event: &KeyEvent) -> Option<Key> {
        if event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match event.code {
            KeyCode::Left => Some(Key::Left),
            KeyCode::Right => Some(Key::Right),
            KeyCode::Up => Some(Key::Up),
            KeyCode::Down => Some(Key::Down),
            KeyCode::PageUp => Some(Key::PageUp),
            KeyCode::PageDown => Some(Key::PageDown),
            KeyCode::Home => Some(Key::Home),
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(d @ 1..=9) => Some(Key::Numpad(d as u8)),
                Some(_) => None,
                None if c.is_ascii_alphabetic() => Some(Key::Letter(c.to_ascii_lowercase())),
                None => None,
            },
            _ => None,
        }
    }
}

/// Applies the single transform change bound to `key`.
///
/// Left/Right adjust the Y scale and Up/Down the X scale. Unbound keys leave
/// the state untouched. Nothing is clamped.
pub fn apply_key(transform: &mut TransformState, key: Key) {
    trace!(?key, "transform key");
    match key {
        Key::Left => transform.nudge_scale(Y, -STEP),
        Key::Right => transform.nudge_scale(Y, STEP),
        Key::Down => transform.nudge_scale(X, STEP),
        Key::Up => transform.nudge_scale(X, -STEP),
        Key::PageUp => transform.nudge_scale(Z, STEP),
        Key::PageDown => transform.nudge_scale(Z, -STEP),
        Key::Home => transform.reset_scale(),

        Key::Numpad(d @ 1..=3) => transform.nudge_color(usize::from(d - 1), -STEP),
        Key::Numpad(d @ 4..=6) => transform.set_color(usize::from(d - 4), COLOR_RESET),
        Key::Numpad(d @ 7..=9) => transform.nudge_color(usize::from(d - 7), STEP),
        Key::Numpad(_) => {}

        Key::Letter('q') => transform.nudge_translate(X, STEP),
        Key::Letter('w') => transform.nudge_translate(Y, STEP),
        Key::Letter('e') => transform.nudge_translate(Z, STEP),
        Key::Letter('a') => transform.nudge_translate(X, -STEP),
        Key::Letter('s') => transform.nudge_translate(Y, -STEP),
        Key::Letter('d') => transform.nudge_translate(Z, -STEP),
        Key::Letter('r') => transform.reset_translate(),
        Key::Letter(_) => {}
    }
}
