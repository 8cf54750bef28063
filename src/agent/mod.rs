//! Agents, endpoints and the slash-command table.

mod command;
pub mod prompts;
mod roster;

pub use command::{Command, CommandTable, EndpointTable, SEARCH_AGENT};
pub use roster::{Agent, AgentProfile, AgentRoster, DEFAULT_AGENT};
