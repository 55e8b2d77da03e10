use std::{collections::HashMap, fmt};

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent as crosstermKeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use serde::Deserialize;
use tracing::{debug, trace};
use tui_input::{Input, InputRequest, backend::crossterm::EventHandler};

use crate::{
    actions::{Action, CompAction},
    app::RootState,
    config::ScanConfig,
    libs::validators::{Validator, always_valid},
    tui::Event,
    utils::{
        help_msg::{HelpEntry, HelpMsg},
        key_events::{KeyEvent, KeyName, key_char},
    },
};

/// What the field does with its text after the validator rejected a code.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    strum::Display,
    strum::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorAction {
    /// Select the whole text on the next tick
    #[default]
    Select,
    /// Empty the field
    Clear,
    /// Leave the field as it is
    None,
}

#[derive(Clone)]
pub(crate) struct ScanFieldOptions {
    /// Keystrokes are not echoed into the field, only a scanner is expected
    pub read_only: bool,
    pub last_key: KeyName,
    /// If false, losing the focus while the field is empty takes it back on the next tick
    pub allow_blur_on_empty: bool,
    pub validator: Validator,
    pub action_on_error: ErrorAction,
    /// Buffer cap; does not limit what the field itself displays
    pub max_length: usize,
    /// Only added to accepted codes
    pub prefix: String,
    pub suffix: String,
    pub title: String,
}

impl Default for ScanFieldOptions {
    fn default() -> Self {
        Self {
            read_only: true,
            last_key: KeyName::Enter,
            allow_blur_on_empty: true,
            validator: always_valid(),
            action_on_error: ErrorAction::Select,
            max_length: 256,
            prefix: String::new(),
            suffix: String::new(),
            title: String::new(),
        }
    }
}

impl fmt::Debug for ScanFieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanFieldOptions")
            .field("read_only", &self.read_only)
            .field("last_key", &self.last_key)
            .field("allow_blur_on_empty", &self.allow_blur_on_empty)
            .field("action_on_error", &self.action_on_error)
            .field("max_length", &self.max_length)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl ScanFieldOptions {
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            read_only: config.read_only,
            last_key: config.last_key.clone(),
            allow_blur_on_empty: config.allow_blur_on_empty,
            validator: config.validator.build()?,
            action_on_error: config.action_on_error,
            max_length: config.max_length,
            prefix: config.prefix.clone(),
            suffix: config.suffix.clone(),
            title: config.title.clone(),
        })
    }

    /// The code reported on success (with prefix and suffix), `None` if the
    /// validator rejects `value`.
    pub fn check(&self, value: &str) -> Option<String> {
        (self.validator)(value).then(|| format!("{}{}{}", self.prefix, value, self.suffix))
    }
}

pub(crate) type ScanCallback = Box<dyn FnMut(String) + Send>;

/// A text field that collects a scanner's keystrokes until `last_key` and
/// reports the result through `on_success` / `on_failure`.
///
/// The collected characters live in a buffer separate from the displayed
/// [`Input`]: the display is only touched by editing (when not read-only) and
/// by [`ErrorAction::Clear`].
///
/// Change the focus: send a [`ScanField::get_focus_action()`] Action
pub(crate) struct ScanField {
    id: u64,
    options: ScanFieldOptions,
    on_success: ScanCallback,
    on_failure: ScanCallback,

    buffer: String,
    input: Input,
    focused: bool,
    selected: bool,

    /// Key kind that feeds the buffer, `Release` when the terminal reports releases
    trigger: KeyEventKind,
    /// Keys pressed while focused and not released yet, by [`base_code`]
    pressed: HashMap<KeyCode, crosstermKeyEvent>,
}

#[derive(Clone, Debug)]
pub(crate) enum ScanFieldAction {
    Key(KeyEvent),
    Paste(String),
    Focus,
    Blur,
    /// Deferred selection of the whole text
    SelectAll,
}

impl fmt::Debug for ScanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanField")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("buffer", &self.buffer)
            .field("value", &self.input.value())
            .field("focused", &self.focused)
            .field("selected", &self.selected)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

impl ScanField {
    pub fn new<S, F>(id: u64, options: ScanFieldOptions, on_success: S, on_failure: F) -> Self
    where
        S: FnMut(String) + Send + 'static,
        F: FnMut(String) + Send + 'static,
    {
        Self {
            id,
            options,
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
            buffer: String::new(),
            input: Input::default(),
            focused: true,
            selected: false,
            trigger: KeyEventKind::Press,
            pressed: HashMap::new(),
        }
    }

    /// Use key releases instead of key presses to feed the buffer.
    pub fn with_key_release(self, key_release: bool) -> Self {
        Self {
            trigger: if key_release {
                KeyEventKind::Release
            } else {
                KeyEventKind::Press
            },
            ..self
        }
    }

    pub fn get_focus_action(&self, focus: bool) -> Action {
        self.get_action(if focus {
            ScanFieldAction::Focus
        } else {
            ScanFieldAction::Blur
        })
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The displayed text, which is not necessarily the buffer.
    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn get_help_msg(&self) -> HelpMsg {
        let mut msg = HelpMsg::default();
        if self.focused {
            msg.push(HelpEntry::new(&self.options.last_key, "end code"));
            msg.push(HelpEntry::new(KeyCode::Esc, "leave field"));
        } else {
            msg.push(HelpEntry::new_plain("tab/enter/i", "focus field"));
        }
        msg
    }

    fn get_action(&self, action: ScanFieldAction) -> Action {
        Action::Comp((CompAction::ScanField(action), self.id))
    }

    fn unwrap_action<'a>(&self, action: &'a Action) -> Option<&'a ScanFieldAction> {
        match action {
            Action::Comp((CompAction::ScanField(action), id)) if *id == self.id => Some(action),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &crosstermKeyEvent, app: &RootState) {
        // a release is decided by its press, which carries the shifted character
        let stroke = match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.pressed.insert(base_code(key.code), *key);
                if !self.options.last_key.matches(key) {
                    self.echo(key);
                }
                *key
            }
            KeyEventKind::Release => match self.pressed.remove(&base_code(key.code)) {
                Some(press) => press,
                // pressed before the field had the focus
                None => return,
            },
        };

        if key.kind != self.trigger {
            return;
        }
        if self.options.last_key.matches(&stroke) {
            self.finish_code(app);
        } else if let Some(c) = key_char(&stroke) {
            self.push_char(c);
        }
    }

    fn push_char(&mut self, c: char) {
        if self.buffer.chars().count() <= self.options.max_length {
            self.buffer.push(c);
        } else {
            trace!(id = self.id, "buffer full, dropping {c:?}");
        }
    }

    fn finish_code(&mut self, app: &RootState) {
        let value = std::mem::take(&mut self.buffer);

        if let Some(code) = self.options.check(&value) {
            debug!(id = self.id, code = %code, "scan accepted");
            (self.on_success)(code);
        } else {
            debug!(
                id = self.id,
                code = %value,
                action = %self.options.action_on_error,
                "scan rejected"
            );
            (self.on_failure)(value);
            match self.options.action_on_error {
                ErrorAction::Select => app.send_action(self.get_action(ScanFieldAction::SelectAll)),
                ErrorAction::Clear => {
                    self.input.reset();
                    self.selected = false;
                }
                ErrorAction::None => {}
            }
        }
    }

    /// What the host text element does with a key press on its own.
    fn echo(&mut self, key: &crosstermKeyEvent) {
        if self.options.read_only {
            return;
        }
        if self.selected {
            self.selected = false;
            // typing over a selection replaces it
            if key_char(key).is_some() {
                self.input.reset();
            }
        }
        self.input.handle_event(&crossterm::event::Event::Key(*key));
    }

    fn paste(&mut self, text: &str) {
        if self.options.read_only {
            return;
        }
        if self.selected {
            self.selected = false;
            self.input.reset();
        }
        text.chars().for_each(|c| {
            self.input.handle(InputRequest::InsertChar(c));
        });
    }

    fn blur(&mut self, app: &RootState) {
        if !self.focused {
            return;
        }
        self.focused = false;
        self.selected = false;
        self.pressed.clear();
        if !self.options.allow_blur_on_empty && self.input.value().is_empty() {
            debug!(id = self.id, "empty field lost focus, refocusing");
            app.send_action(self.get_action(ScanFieldAction::Focus));
        }
    }

    fn select_all(&mut self) {
        self.input.handle(InputRequest::GoToEnd);
        self.selected = true;
    }
}

/// Press and release of one physical key may report different characters
/// (`A` pressed, `a` released with Shift held).
fn base_code(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_lowercase().next().unwrap_or(c)),
        code => code,
    }
}

impl super::Component for ScanField {
    fn get_id(&self) -> u64 {
        self.id
    }

    fn handle_events(&self, event: &Event, app: &RootState) -> Result<()> {
        if !self.focused {
            return Ok(());
        }
        match event {
            Event::Key(key) => {
                app.send_action(self.get_action(ScanFieldAction::Key((*key).into())))
            }
            Event::Paste(s) => app.send_action(self.get_action(ScanFieldAction::Paste(s.clone()))),
            Event::FocusLost => app.send_action(self.get_action(ScanFieldAction::Blur)),
            _ => (),
        }
        Ok(())
    }

    fn update(&mut self, action: &Action, app: &RootState) -> Result<()> {
        let Some(action) = self.unwrap_action(action) else {
            return Ok(());
        };

        match action {
            ScanFieldAction::Key(key) => self.handle_key(key, app),
            ScanFieldAction::Paste(text) => self.paste(text),
            ScanFieldAction::Focus => self.focused = true,
            ScanFieldAction::Blur => self.blur(app),
            ScanFieldAction::SelectAll => self.select_all(),
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame, area: &Rect, _app: &RootState) {
        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);
        let border_style = if self.focused {
            Color::Cyan.into()
        } else {
            Style::default()
        };
        let text_style = if self.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        let field = Paragraph::new(Span::styled(self.input.value(), text_style))
            .scroll((0, scroll as u16))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border_style)
                    .title(self.options.title.as_str()),
            );
        frame.render_widget(field, *area);

        if self.focused && !self.options.read_only {
            let x = self.input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1))
        }
    }
}

#[cfg(test)]
impl ScanField {
    pub fn buffer(&self) -> &str {
        &self.buffer
    }
    pub fn is_selected(&self) -> bool {
        self.selected
    }
}
