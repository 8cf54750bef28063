//! Interactive chat mode.
//!
//! A REPL over [`crate::session::ChatSession`] with local slash commands,
//! a command palette and streamed replies.

/// Input parsing and autocomplete.
pub mod command;
mod repl;
pub mod ui;

pub use repl::ChatRepl;
pub use ui::SessionInfo;
