use std::ops::Deref;

use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use super::key_events::KeyEvent;

#[derive(Debug, Clone)]
enum HelpKeyEvent {
    Key(KeyEvent),
    Plain(String),
}

/// One `description: key` pair of the help bar.
#[derive(Debug, Clone)]
pub(crate) struct HelpEntry {
    key: HelpKeyEvent,
    desc: String,
}

impl HelpEntry {
    pub(crate) fn new<T: Into<String>, K: Into<KeyEvent>>(event: K, desc: T) -> Self {
        Self {
            key: HelpKeyEvent::Key(event.into()),
            desc: desc.into(),
        }
    }

    /// An entry whose key label is free text, e.g. `tab/i` for several bindings.
    pub(crate) fn new_plain<T: Into<String>>(event: T, desc: T) -> Self {
        Self {
            key: HelpKeyEvent::Plain(event.into()),
            desc: desc.into(),
        }
    }

    pub(crate) fn key(&self) -> String {
        match &self.key {
            HelpKeyEvent::Key(key) => key.to_string(),
            HelpKeyEvent::Plain(key) => key.clone(),
        }
    }

    pub(crate) fn desc(&self) -> &str {
        &self.desc
    }
}

impl std::fmt::Display for HelpEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.desc(), self.key())
    }
}

impl From<HelpEntry> for String {
    fn from(val: HelpEntry) -> Self {
        val.to_string()
    }
}

#[derive(Default, Clone, Debug)]
pub(crate) struct HelpMsg {
    slices: Vec<HelpEntry>,
}

impl From<Vec<HelpEntry>> for HelpMsg {
    fn from(slices: Vec<HelpEntry>) -> Self {
        Self { slices }
    }
}

impl HelpMsg {
    pub(crate) fn extend(&mut self, other: &HelpMsg) {
        self.slices.extend(other.slices.iter().cloned());
    }

    pub(crate) fn push(&mut self, entry: HelpEntry) {
        self.slices.push(entry);
    }

    pub(crate) fn render(&self, frame: &mut Frame, area: Rect) {
        let help_msg = self.to_string();
        let paragraph = Paragraph::new(help_msg).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1)),
        );
        frame.render_widget(paragraph, area);
    }
}

impl Deref for HelpMsg {
    type Target = Vec<HelpEntry>;

    fn deref(&self) -> &Self::Target {
        &self.slices
    }
}

impl std::fmt::Display for HelpMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .slices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(" | ");
        write!(f, "{joined}")
    }
}

impl From<HelpMsg> for String {
    fn from(val: HelpMsg) -> Self {
        val.to_string()
    }
}

#[cfg(test)]
mod test {
    use crossterm::event::KeyCode;

    use super::*;

    #[test]
    fn test_help_entry_key() {
        let entry = HelpEntry::new('c', "Clear history");
        assert_eq!(entry.key(), "c");
        assert_eq!(entry.desc(), "Clear history");
        assert_eq!(entry.to_string(), "Clear history: c");
    }

    #[test]
    fn test_help_entry_plain() {
        let entry = HelpEntry::new_plain("tab/i", "Focus field");
        assert_eq!(entry.key(), "tab/i");
        assert_eq!(entry.to_string(), "Focus field: tab/i");
    }

    #[test]
    fn test_help_msg_join() {
        let mut msg = HelpMsg::from(vec![HelpEntry::new(KeyCode::Esc, "Leave field")]);
        msg.extend(&HelpMsg::from(vec![HelpEntry::new('q', "Quit")]));
        assert_eq!(msg.len(), 2);
        assert_eq!(String::from(msg), "Leave field: esc | Quit: q");
    }
}
