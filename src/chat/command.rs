use inquire::autocompletion::{Autocomplete, Replacement};
use std::sync::Arc;

use crate::session::ChatSession;

/// REPL commands handled locally: (command, description).
///
/// Everything else, including agent commands like `/cve`, goes to the
/// session.
pub const LOCAL_COMMANDS: &[(&str, &str)] = &[
    ("/agents", "List agents"),
    ("/config", "Show current configuration"),
    ("/help", "Show available commands"),
    ("/history", "Show this session's messages"),
    ("/palette", "Search agent commands"),
    ("/quit", "Exit chat mode"),
    ("/use", "Switch to another agent"),
];

/// Autocompleter for local commands and the session's agent commands.
#[derive(Clone)]
pub struct PaletteCompleter {
    session: Arc<ChatSession>,
}

impl PaletteCompleter {
    pub const fn new(session: Arc<ChatSession>) -> Self {
        Self { session }
    }
}

impl Autocomplete for PaletteCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') || input.contains(char::is_whitespace) {
            return Ok(vec![]);
        }

        let local = LOCAL_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"));

        let agent = self
            .session
            .suggest(input)
            .into_iter()
            .map(|c| format!("{}  {}", c.trigger, c.description));

        Ok(local.chain(agent).collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement = highlighted_suggestion
            .map(|s| format!("{} ", s.split_whitespace().next().unwrap_or("")));
        Ok(replacement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    Agents,
    Config,
    Help,
    History,
    Palette(String),
    Quit,
    /// `/use` with no argument opens a picker.
    Use(Option<String>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// Sent to the session as-is.
    Submit(String),
    Local(LocalCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    let command = match head {
        "/agents" => LocalCommand::Agents,
        "/config" => LocalCommand::Config,
        "/help" => LocalCommand::Help,
        "/history" => LocalCommand::History,
        "/palette" => LocalCommand::Palette(rest.to_string()),
        "/quit" | "/exit" | "/q" => LocalCommand::Quit,
        "/use" => LocalCommand::Use((!rest.is_empty()).then(|| rest.to_string())),
        _ => return Input::Submit(input.to_string()),
    };
    Input::Local(command)
}
