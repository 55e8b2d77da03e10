use std::{fmt, ops::Deref, str::FromStr};

use crossterm::event::{KeyCode, KeyEvent as crosstermKeyEvent, KeyModifiers};
use serde::Deserialize;

#[cfg(not(tarpaulin_include))]
pub fn key_event_to_string(key_event: &crosstermKeyEvent) -> String {
    let char;
    let key_code = match key_event.code {
        KeyCode::Backspace => "backspace",
        KeyCode::Enter => "enter",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Tab => "tab",
        KeyCode::BackTab => "backtab",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::F(c) => {
            char = format!("f({c})");
            &char
        }
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => {
            char = c.to_string();
            &char
        }
        KeyCode::Esc => "esc",
        KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::Menu
        | KeyCode::ScrollLock
        | KeyCode::Media(_)
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::KeypadBegin
        | KeyCode::Modifier(_) => "",
    };

    let mut modifiers = Vec::with_capacity(3);

    if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
        modifiers.push("ctrl");
    }

    if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
        modifiers.push("shift");
    }

    if key_event.modifiers.intersects(KeyModifiers::ALT) {
        modifiers.push("alt");
    }

    let mut key = modifiers.join("-");

    if !key.is_empty() {
        key.push('-');
    }
    key.push_str(key_code);

    key
}

/// The character a key contributes to typed text, if any.
///
/// Chords with Ctrl or Alt never produce text.
pub fn key_char(key_event: &crosstermKeyEvent) -> Option<char> {
    if key_event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key_event.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent(pub crosstermKeyEvent);

impl From<crosstermKeyEvent> for KeyEvent {
    fn from(key_event: crosstermKeyEvent) -> Self {
        Self(key_event)
    }
}
impl From<KeyCode> for KeyEvent {
    fn from(key_code: KeyCode) -> Self {
        Self(crosstermKeyEvent::new(key_code, KeyModifiers::NONE))
    }
}
impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self(crosstermKeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }
}
impl From<KeyEvent> for crosstermKeyEvent {
    fn from(val: KeyEvent) -> Self {
        val.0
    }
}
impl Deref for KeyEvent {
    type Target = crosstermKeyEvent;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<KeyEvent> for String {
    fn from(val: KeyEvent) -> Self {
        key_event_to_string(&val.0)
    }
}
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", key_event_to_string(self))
    }
}

/// A logical key name, as written in configuration (`"Enter"`, `"Tab"`, `"F2"`, `"#"`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum KeyName {
    #[default]
    Enter,
    Tab,
    Space,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Char(char),
}

impl KeyName {
    /// Whether `key_event` is a stroke of this key. Modifiers are ignored.
    pub fn matches(&self, key_event: &crosstermKeyEvent) -> bool {
        match (self, key_event.code) {
            (KeyName::Enter, KeyCode::Enter) => true,
            (KeyName::Tab, KeyCode::Tab) => true,
            (KeyName::Space, KeyCode::Char(' ')) => true,
            (KeyName::Backspace, KeyCode::Backspace) => true,
            (KeyName::ArrowUp, KeyCode::Up) => true,
            (KeyName::ArrowDown, KeyCode::Down) => true,
            (KeyName::ArrowLeft, KeyCode::Left) => true,
            (KeyName::ArrowRight, KeyCode::Right) => true,
            (KeyName::Home, KeyCode::Home) => true,
            (KeyName::End, KeyCode::End) => true,
            (KeyName::PageUp, KeyCode::PageUp) => true,
            (KeyName::PageDown, KeyCode::PageDown) => true,
            (KeyName::F(n), KeyCode::F(m)) => *n == m,
            (KeyName::Char(c), KeyCode::Char(k)) => *c == k,
            _ => false,
        }
    }
}

impl From<&KeyName> for KeyEvent {
    fn from(name: &KeyName) -> Self {
        let code = match name {
            KeyName::Enter => KeyCode::Enter,
            KeyName::Tab => KeyCode::Tab,
            KeyName::Space => KeyCode::Char(' '),
            KeyName::Backspace => KeyCode::Backspace,
            KeyName::ArrowUp => KeyCode::Up,
            KeyName::ArrowDown => KeyCode::Down,
            KeyName::ArrowLeft => KeyCode::Left,
            KeyName::ArrowRight => KeyCode::Right,
            KeyName::Home => KeyCode::Home,
            KeyName::End => KeyCode::End,
            KeyName::PageUp => KeyCode::PageUp,
            KeyName::PageDown => KeyCode::PageDown,
            KeyName::F(n) => KeyCode::F(*n),
            KeyName::Char(c) => KeyCode::Char(*c),
        };
        code.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyNameError(String);

impl fmt::Display for ParseKeyNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key name `{}`", self.0)
    }
}

impl std::error::Error for ParseKeyNameError {}

impl FromStr for KeyName {
    type Err = ParseKeyNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "Enter" => KeyName::Enter,
            "Tab" => KeyName::Tab,
            " " | "Space" => KeyName::Space,
            "Backspace" => KeyName::Backspace,
            "ArrowUp" => KeyName::ArrowUp,
            "ArrowDown" => KeyName::ArrowDown,
            "ArrowLeft" => KeyName::ArrowLeft,
            "ArrowRight" => KeyName::ArrowRight,
            "Home" => KeyName::Home,
            "End" => KeyName::End,
            "PageUp" => KeyName::PageUp,
            "PageDown" => KeyName::PageDown,
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyName::Char(c),
                    _ => s
                        .strip_prefix('F')
                        .and_then(|n| n.parse::<u8>().ok())
                        .filter(|n| (1..=24).contains(n))
                        .map(KeyName::F)
                        .ok_or_else(|| ParseKeyNameError(s.to_string()))?,
                }
            }
        };
        Ok(name)
    }
}

impl TryFrom<String> for KeyName {
    type Error = ParseKeyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::Enter => write!(f, "Enter"),
            KeyName::Tab => write!(f, "Tab"),
            KeyName::Space => write!(f, "Space"),
            KeyName::Backspace => write!(f, "Backspace"),
            KeyName::ArrowUp => write!(f, "ArrowUp"),
            KeyName::ArrowDown => write!(f, "ArrowDown"),
            KeyName::ArrowLeft => write!(f, "ArrowLeft"),
            KeyName::ArrowRight => write!(f, "ArrowRight"),
            KeyName::Home => write!(f, "Home"),
            KeyName::End => write!(f, "End"),
            KeyName::PageUp => write!(f, "PageUp"),
            KeyName::PageDown => write!(f, "PageDown"),
            KeyName::F(n) => write!(f, "F{n}"),
            KeyName::Char(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use crate::tui::Event;

    use super::*;
    use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

    pub fn get_key_evt(key: KeyCode) -> Event {
        Event::Key(crosstermKeyEvent::new(key, KeyModifiers::NONE))
    }
    pub fn get_char_evt(key: char) -> Event {
        Event::Key(crosstermKeyEvent::new(
            KeyCode::Char(key),
            KeyModifiers::NONE,
        ))
    }
    pub fn get_ctrl_evt(key: char) -> Event {
        Event::Key(crosstermKeyEvent::new(
            KeyCode::Char(key),
            KeyModifiers::CONTROL,
        ))
    }
    pub fn get_release_evt(key: KeyCode) -> Event {
        Event::Key(crosstermKeyEvent::new_with_kind(
            key,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ))
    }
}
