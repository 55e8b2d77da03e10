use color_eyre::eyre::{Context, Result};
use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};
use tracing::info;

use crate::{
    actions::Action,
    app::RootState,
    component::{
        Component,
        scan_field::{ScanField, ScanFieldOptions},
    },
    libs::history::{ScanOutcome, ScanRecord},
    tui::Event,
    utils::help_msg::{HelpEntry, HelpMsg},
};

use super::Page;

#[derive(Clone, Debug)]
pub enum ScannerAction {
    Scanned(ScanOutcome, String),
    ClearHistory,
}

impl From<ScannerAction> for Action {
    fn from(value: ScannerAction) -> Self {
        Action::Scanner(value)
    }
}

/// The scan field, the latest outcome and the session history.
#[derive(Debug)]
pub struct Scanner {
    field: ScanField,
}

impl Scanner {
    pub fn new(app: &RootState) -> Result<Self> {
        let options = ScanFieldOptions::from_config(&app.config.scan)
            .context("Error building the scan field")?;
        let accepted = app.action_sender();
        let rejected = app.action_sender();

        let field = ScanField::new(
            rand::random::<u64>(),
            options,
            move |code| accepted.send(ScannerAction::Scanned(ScanOutcome::Accepted, code)),
            move |code| rejected.send(ScannerAction::Scanned(ScanOutcome::Rejected, code)),
        )
        .with_key_release(app.key_release_events);

        Ok(Self { field })
    }

    fn get_help_msg(&self) -> HelpMsg {
        let mut msg = self.field.get_help_msg();
        if !self.field.is_focused() {
            msg.push(HelpEntry::new('c', "clear history"));
            msg.push(HelpEntry::new('q', "quit"));
        }
        msg.push(HelpEntry::new_plain("ctrl-c", "quit"));
        msg
    }

    fn status_line(record: Option<&ScanRecord>) -> Line<'_> {
        match record {
            Some(r) if r.outcome == ScanOutcome::Accepted => {
                Line::from(vec![Span::from(" ✔ accepted: ").green(), Span::from(r.code.as_str())])
            }
            Some(r) => Line::from(vec![Span::from(" ✘ rejected: ").red(), Span::from(r.code.as_str())]),
            None => Line::from(" waiting for a scan").dark_gray(),
        }
    }

    fn history_item(record: &ScanRecord) -> ListItem<'_> {
        let outcome_style = match record.outcome {
            ScanOutcome::Accepted => Style::default().fg(Color::Green),
            ScanOutcome::Rejected => Style::default().fg(Color::Red),
        };
        ListItem::new(Line::from(vec![
            Span::from(record.at.format("%H:%M:%S ").to_string()).dark_gray(),
            Span::styled(format!("{:<9}", record.outcome.to_string()), outcome_style),
            Span::from(record.code.as_str()),
        ]))
    }
}

impl Page for Scanner {
    fn render(&self, frame: &mut Frame, app: &RootState) {
        let [field_area, status_area, history_area, help_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .areas(frame.area());

        self.field.draw(frame, &field_area, app);

        frame.render_widget(
            Paragraph::new(Self::status_line(app.history.latest())),
            status_area,
        );

        let history = List::new(app.history.iter().map(Self::history_item)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!("History ({})", app.history.len())),
        );
        frame.render_widget(history, history_area);

        self.get_help_msg().render(frame, help_area);
    }

    fn handle_events(&self, app: &RootState, event: Event) -> Result<()> {
        if let Event::Key(key) = &event {
            let pressed = key.kind == KeyEventKind::Press;

            if pressed && key.modifiers.contains(KeyModifiers::CONTROL) {
                match key.code {
                    KeyCode::Char('c') => {
                        app.send_action(Action::Quit);
                        return Ok(());
                    }
                    KeyCode::Char('z') => {
                        app.send_action(Action::Suspend);
                        return Ok(());
                    }
                    _ => (),
                }
            }

            if !self.field.is_focused() {
                if pressed {
                    match key.code {
                        KeyCode::Tab | KeyCode::Enter | KeyCode::Char('i') => {
                            app.send_action(self.field.get_focus_action(true))
                        }
                        KeyCode::Char('c') => app.send_action(ScannerAction::ClearHistory),
                        KeyCode::Char('q') | KeyCode::Esc => app.send_action(Action::Quit),
                        _ => (),
                    }
                }
                return Ok(());
            }

            if key.code == KeyCode::Esc {
                if pressed {
                    app.send_action(self.field.get_focus_action(false));
                }
                return Ok(());
            }
        }

        self.field.handle_events(&event, app)
    }

    fn update(&mut self, app: &RootState, action: Action) -> Result<()> {
        self.field.update(&action, app)
    }

    fn get_name(&self) -> String {
        "Scanner".to_string()
    }

    fn init(&mut self, app: &RootState) {
        info!(
            field = self.field.get_id(),
            key_release = app.key_release_events,
            last_key = %app.config.scan.last_key,
            "scanner ready"
        );
    }
}

#[cfg(test)]
mod test {
    use crate::{
        config::Config,
        utils::key_events::test_utils::{get_char_evt, get_ctrl_evt, get_key_evt},
    };

    use super::*;

    fn get_test_objs(config: Config) -> (RootState, Scanner) {
        let app = RootState::new(Some(config));
        let page = Scanner::new(&app).unwrap();
        (app, page)
    }

    fn scan(app: &mut RootState, page: &mut Scanner, code: &str) {
        for c in code.chars() {
            app.handle_event_and_update(page, get_char_evt(c));
        }
        app.handle_event_and_update(page, get_key_evt(KeyCode::Enter));
    }

    fn gtin_config() -> Config {
        let mut config = Config::default();
        config.scan.validator.kind = crate::libs::validators::ValidatorKind::Gtin;
        config
    }

    #[test]
    fn test_outcomes_recorded() {
        let (mut app, mut page) = get_test_objs(gtin_config());

        scan(&mut app, &mut page, "4006381333931");
        scan(&mut app, &mut page, "4006381333932");

        let latest = app.history.latest().unwrap();
        assert_eq!(latest.code, "4006381333932");
        assert_eq!(latest.outcome, ScanOutcome::Rejected);

        let accepted: Vec<&str> = app.accepted.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(accepted, ["4006381333931"]);
    }

    #[test]
    fn test_prefix_from_config() {
        let mut config = Config::default();
        config.scan.prefix = "P-".into();
        config.scan.suffix = "-S".into();
        let (mut app, mut page) = get_test_objs(config);

        scan(&mut app, &mut page, "ABC");

        assert_eq!(app.history.latest().unwrap().code, "P-ABC-S");
    }

    #[test]
    fn test_esc_blurs_and_keys_navigate() {
        let (mut app, mut page) = get_test_objs(Config::default());

        scan(&mut app, &mut page, "1");
        assert_eq!(app.history.len(), 1);

        app.handle_event_and_update(&mut page, get_key_evt(KeyCode::Esc));
        assert!(!page.field.is_focused());
        assert!(!app.should_quit);

        app.handle_event_and_update(&mut page, get_char_evt('c'));
        assert!(app.history.is_empty());
        assert_eq!(page.field.buffer(), "");

        app.handle_event_and_update(&mut page, get_char_evt('i'));
        assert!(page.field.is_focused());
        // the focus key is not part of the next code
        assert_eq!(page.field.buffer(), "");

        app.handle_event_and_update(&mut page, get_key_evt(KeyCode::Esc));
        app.handle_event_and_update(&mut page, get_char_evt('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_scanning() {
        let (mut app, mut page) = get_test_objs(Config::default());

        app.handle_event_and_update(&mut page, get_char_evt('a'));
        app.handle_event_and_update(&mut page, get_ctrl_evt('c'));

        assert!(app.should_quit);
    }

    #[test]
    fn test_sticky_focus() {
        let mut config = Config::default();
        config.scan.allow_blur_on_empty = false;
        let (mut app, mut page) = get_test_objs(config);

        app.handle_event_and_update(&mut page, get_key_evt(KeyCode::Esc));
        assert!(page.field.is_focused());

        app.handle_event_and_update(&mut page, Event::FocusLost);
        assert!(page.field.is_focused());
    }

    #[test]
    fn test_help_msg() {
        let (mut app, mut page) = get_test_objs(Config::default());
        assert_eq!(
            String::from(page.get_help_msg()),
            "end code: enter | leave field: esc | quit: ctrl-c"
        );

        app.handle_event_and_update(&mut page, get_key_evt(KeyCode::Esc));
        assert_eq!(
            String::from(page.get_help_msg()),
            "focus field: tab/enter/i | clear history: c | quit: q | quit: ctrl-c"
        );
    }
}
