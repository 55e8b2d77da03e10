use tracing::warn;

use crate::{component::scan_field::ScanFieldAction, page::scanner::ScannerAction};

#[derive(Clone, Debug)]
pub enum Action {
    Tick,
    Render,
    Quit,
    Suspend,

    Scanner(ScannerAction),

    Comp((CompAction, u64)),
}

/// Actions addressed to one component instance, the `u64` is its id.
#[derive(Clone, Debug)]
pub enum CompAction {
    ScanField(ScanFieldAction),
}

/// Sending half of the action queue.
///
/// Anything sent here runs after the event currently being handled, which is
/// how components defer work to the next tick.
#[derive(Clone, Debug)]
pub struct ActionSender(pub tokio::sync::mpsc::UnboundedSender<Action>);

impl ActionSender {
    pub fn send<T: Into<Action>>(&self, action: T) {
        if let Err(e) = self.0.send(action.into()) {
            warn!(action = ?e.0, "Action receiver is closed, dropping action");
        }
    }
}
impl From<tokio::sync::mpsc::UnboundedSender<Action>> for ActionSender {
    fn from(value: tokio::sync::mpsc::UnboundedSender<Action>) -> Self {
        ActionSender(value)
    }
}
