use crate::config::Config;
use crate::libs::history::{ScanHistory, ScanOutcome, ScanRecord};
use crate::page::scanner::ScannerAction;
use crate::{
    actions::{Action, ActionSender},
    page::Page,
    tui,
};
use color_eyre::eyre::Result;
use tracing::{debug, info};

pub struct RootState {
    pub should_quit: bool,
    action_tx: ActionSender,
    action_rx: tokio::sync::mpsc::UnboundedReceiver<Action>,

    pub config: Config,
    /// Latest outcomes shown on screen, bounded by `history_size`
    pub history: ScanHistory,
    /// Every accepted record of the session in scan order, printed on exit
    pub accepted: Vec<ScanRecord>,
    /// Whether the terminal reports key releases
    pub key_release_events: bool,
}

impl RootState {
    pub fn new(config: Option<Config>) -> Self {
        let (action_tx, action_rx) = tokio::sync::mpsc::unbounded_channel();
        let config = config.unwrap_or_default();

        Self {
            should_quit: false,
            action_tx: action_tx.into(),
            action_rx,
            history: ScanHistory::new(config.config.history_size),
            accepted: Vec::new(),
            config,
            key_release_events: false,
        }
    }

    /// Queue an action, it is performed after the current event is handled.
    pub fn send_action<T: Into<Action>>(&self, action: T) {
        self.action_tx.send(action);
    }

    pub fn action_sender(&self) -> ActionSender {
        self.action_tx.clone()
    }

    pub fn try_recv(&mut self) -> Result<Action, tokio::sync::mpsc::error::TryRecvError> {
        self.action_rx.try_recv()
    }

    /// Handle the actions that change the root state
    pub fn update(&mut self, action: &Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Scanner(ScannerAction::Scanned(outcome, code)) => {
                info!(code = %code, outcome = %outcome, "scan finished");
                let record = ScanRecord::new(code.as_str(), *outcome);
                if *outcome == ScanOutcome::Accepted {
                    self.accepted.push(record.clone());
                }
                self.history.push(record);
            }
            Action::Scanner(ScannerAction::ClearHistory) => {
                debug!(count = self.history.len(), "clearing scan history");
                self.history.clear();
            }
            _ => (),
        }
    }
}

#[cfg(test)]
impl RootState {
    /// Handle an event the way [`App`] does, without a terminal
    pub fn handle_event_and_update<P: Page + ?Sized>(&mut self, page: &mut P, event: tui::Event) {
        page.handle_events(self, event).unwrap();
        while let Ok(action) = self.try_recv() {
            self.update(&action);
            page.update(self, action).unwrap();
        }
    }
}

pub struct App {
    pub page: Box<dyn Page>,
    pub state: RootState,
    pub tui: tui::TuiEnum,
}

impl App {
    pub fn new(state: RootState, page: Box<dyn Page>, tui: tui::TuiEnum) -> Self {
        Self { page, state, tui }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.tui.enter()?;
        self.page.init(&self.state);

        loop {
            let e = self.tui.next().await?;
            self.handle_event(e)?;

            // application exit
            if self.state.should_quit {
                break;
            }
        }

        self.tui.exit()?;
        Ok(())
    }

    /// Handle a [`tui::Event`]
    ///
    /// Application-wide events are turned into actions here, the remaining
    /// ones are passed to the current page. Every action queued while doing so,
    /// and every action queued while performing those, is performed before
    /// returning.
    fn handle_event(&mut self, event: tui::Event) -> Result<()> {
        match event {
            tui::Event::Tick => self.state.send_action(Action::Tick),
            tui::Event::Render | tui::Event::Resize(_, _) => {
                self.state.send_action(Action::Render)
            }
            tui::Event::Error => self.state.send_action(Action::Quit),
            tui::Event::Init => (),
            _ => self.page.handle_events(&self.state, event)?,
        }

        while let Ok(action) = self.state.try_recv() {
            self.perform_action(action)?;
        }
        Ok(())
    }

    /// Perform an action
    ///
    /// This SHOULD be the only place where the state of the application is changed.
    fn perform_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Tick => {}
            Action::Render => {
                self.tui.draw(|f| {
                    self.page.render(f, &self.state);
                })?;
            }
            Action::Suspend => {
                self.tui.suspend()?;
                self.state.send_action(Action::Render);
            }
            _ => {
                self.state.update(&action);
                self.page.update(&self.state, action)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crossterm::event::KeyCode;
    use insta::assert_snapshot;

    use crate::{
        config::OutputFormat,
        libs::history::report,
        page::scanner::Scanner,
        tui::{Event, TestTui},
    };

    use super::*;

    fn get_app(width: u16, height: u16) -> App {
        let state = RootState::new(None);
        let page = Scanner::new(&state).unwrap();
        App::new(state, Box::new(page), TestTui::new(width, height).into())
    }

    fn type_code(app: &mut App, code: &str) {
        for c in code.chars() {
            app.handle_event(c.into()).unwrap();
        }
        app.handle_event(KeyCode::Enter.into()).unwrap();
    }

    #[test]
    fn test_root_state_update() {
        let mut state = RootState::new(None);

        state.update(&ScannerAction::Scanned(ScanOutcome::Accepted, "A1".into()).into());
        state.update(&ScannerAction::Scanned(ScanOutcome::Rejected, "B2".into()).into());
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history.latest().unwrap().code, "B2");

        state.update(&ScannerAction::ClearHistory.into());
        assert!(state.history.is_empty());

        assert!(!state.should_quit);
        state.update(&Action::Quit);
        assert!(state.should_quit);
    }

    #[test]
    fn test_history_size_from_config() {
        let mut config = Config::default();
        config.config.history_size = 2;
        let mut state = RootState::new(Some(config));

        for code in ["1", "2", "3"] {
            state.update(&ScannerAction::Scanned(ScanOutcome::Accepted, code.into()).into());
        }

        let codes: Vec<&str> = state.history.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["3", "2"]);
    }

    #[test]
    fn test_accepted_outlive_history() {
        let mut state = RootState::new(None);

        for i in 0..60 {
            state.update(&ScannerAction::Scanned(ScanOutcome::Accepted, format!("C{i}")).into());
        }
        state.update(&ScannerAction::Scanned(ScanOutcome::Rejected, "BAD".into()).into());
        state.update(&ScannerAction::ClearHistory.into());
        state.update(&ScannerAction::Scanned(ScanOutcome::Accepted, "C60".into()).into());

        assert_eq!(state.history.len(), 1);
        assert_eq!(state.accepted.len(), 61);

        let lines = report(&state.accepted, OutputFormat::Lines).unwrap().unwrap();
        let lines: Vec<&str> = lines.lines().collect();
        assert_eq!(lines.len(), 61);
        assert_eq!(lines.first(), Some(&"C0"));
        assert_eq!(lines.last(), Some(&"C60"));
    }

    #[test]
    fn test_app_scans_and_quits() {
        let mut app = get_app(40, 10);

        type_code(&mut app, "123");
        type_code(&mut app, "456");
        let codes: Vec<&str> = app.state.accepted.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["123", "456"]);

        app.handle_event(KeyCode::Esc.into()).unwrap();
        assert!(!app.state.should_quit);
        app.handle_event('q'.into()).unwrap();
        assert!(app.state.should_quit);
    }

    #[test]
    fn test_error_event_quits() {
        let mut app = get_app(40, 10);
        app.handle_event(Event::Error).unwrap();
        assert!(app.state.should_quit);
    }

    #[test]
    fn test_render_before_any_scan() {
        let mut app = get_app(60, 9);
        app.handle_event(Event::Render).unwrap();

        assert_snapshot!(app.tui.backend(), @r#"
        "╭Scan──────────────────────────────────────────────────────╮"
        "│                                                          │"
        "╰──────────────────────────────────────────────────────────╯"
        " waiting for a scan                                         "
        "╭History (0)───────────────────────────────────────────────╮"
        "╰──────────────────────────────────────────────────────────╯"
        "╭──────────────────────────────────────────────────────────╮"
        "│ end code: enter | leave field: esc | quit: ctrl-c        │"
        "╰──────────────────────────────────────────────────────────╯"
        "#);
    }
}
