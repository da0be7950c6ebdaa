//! Chat-facing bot logic: commands, button payloads, and the update loop.

mod choice;
mod command;
mod dispatcher;
#[cfg(test)]
mod fakes;
mod handler;
pub mod messages;

pub use choice::Choice;
pub use command::Command;
pub use dispatcher::{route, Dispatcher};
pub use handler::{ChoiceOutcome, PlayOutcome, SessionHandler};
