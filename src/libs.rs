//! Domain helpers that do not depend on the terminal.

pub(crate) mod history;
pub(crate) mod validators;
