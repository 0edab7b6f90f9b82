// Library interface for the swarmkit CLI.
// Integration tests drive commands and sessions through it.

pub mod commands;
pub mod demos;
pub mod repl;
pub mod session;

pub use commands::{handle_command, CommandResult};
pub use demos::{catalog, find, Category, Demo, Models, Scenario};
pub use session::{ChatSession, TurnReport};
