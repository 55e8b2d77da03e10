pub(crate) mod scan_field;

use color_eyre::eyre::Result;
use ratatui::{Frame, layout::Rect};

use crate::{actions::Action, app::RootState, tui::Event};

/// A widget that lives inside a page.
///
/// `handle_events` only translates events into actions addressed to the
/// component; all state changes happen in `update`.
pub(crate) trait Component {
    fn get_id(&self) -> u64;

    fn handle_events(&self, event: &Event, app: &RootState) -> Result<()>;

    fn update(&mut self, action: &Action, app: &RootState) -> Result<()>;

    fn draw(&self, frame: &mut Frame, area: &Rect, app: &RootState);
}
