//! Pages are full-screen layers of the application.
//!
//! Only one page is shown at a time; it receives every input event the app
//! does not handle itself and every action the app does not consume.

use color_eyre::eyre::Result;
use ratatui::Frame;

use crate::{actions::Action, app::RootState, tui::Event};

pub(crate) mod scanner;

pub(crate) trait Page {
    fn render(&self, frame: &mut Frame, app: &RootState);

    /// Translate an event into actions, state is only changed in [`Page::update`]
    fn handle_events(&self, app: &RootState, event: Event) -> Result<()>;

    fn update(&mut self, app: &RootState, action: Action) -> Result<()>;

    #[allow(dead_code)]
    fn get_name(&self) -> String;

    fn init(&mut self, _app: &RootState) {}
}
