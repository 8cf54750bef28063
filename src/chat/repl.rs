use anyhow::Result;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use inquire::{Select, Text};
use std::sync::{Arc, Mutex, PoisonError};

use super::command::{Input, LocalCommand, PaletteCompleter, parse_input};
use super::ui::{self, SessionInfo};
use crate::agent::AgentProfile;
use crate::error::ChatError;
use crate::output;
use crate::session::{ChatSession, Message, SessionObserver, TurnOutcome};
use crate::status;
use crate::ui::{Spinner, Style, answered};

/// Prints a reply as it streams in.
///
/// Partials are cumulative, so only the unseen suffix is written.
#[derive(Default)]
struct StreamPrinter {
    state: Mutex<PrinterState>,
}

#[derive(Default)]
struct PrinterState {
    spinner: Option<Spinner>,
    printed: usize,
}

impl StreamPrinter {
    fn begin(&self, agent_name: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.spinner = Some(Spinner::new(&format!("{agent_name} is thinking...")));
        state.printed = 0;
    }

    /// Stops the spinner; returns whether any text was printed.
    fn finish(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(spinner) = state.spinner.take() {
            spinner.stop();
        }
        state.printed > 0
    }
}

impl SessionObserver for StreamPrinter {
    fn on_progress(&self, partial: &str, _is_complete: bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(spinner) = state.spinner.take() {
            spinner.stop();
        }
        if partial.len() > state.printed && partial.is_char_boundary(state.printed) {
            output::print_fragment(&partial[state.printed..]);
            state.printed = partial.len();
        }
    }

    fn on_error(&self, error: &ChatError, _message: &Message) {
        tracing::debug!(%error, aborted = error.is_abort(), "reply failed");
    }
}

/// The interactive prompt loop on top of a [`ChatSession`].
pub struct ChatRepl {
    session: Arc<ChatSession>,
    printer: Arc<StreamPrinter>,
    info: SessionInfo,
}

impl ChatRepl {
    pub fn new(session: Arc<ChatSession>, info: SessionInfo) -> Self {
        let printer = Arc::new(StreamPrinter::default());
        session.add_observer(printer.clone());
        Self {
            session,
            printer,
            info,
        }
    }

    pub async fn run(&self) -> Result<()> {
        ui::print_header(&self.selected());
        crate::info!(
            "{} {}\n",
            Style::label("Backend"),
            Style::secondary(&self.info.base_url)
        );

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        let completer = PaletteCompleter::new(Arc::clone(&self.session));

        loop {
            let Some(line) = answered(
                Text::new("")
                    .with_render_config(render_config)
                    .with_autocomplete(completer.clone())
                    .with_help_message("Ask a question, /help for commands, Ctrl+C to quit")
                    .prompt(),
            )?
            else {
                println!();
                break;
            };

            match parse_input(&line) {
                Input::Empty => {}
                Input::Local(cmd) => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                Input::Submit(text) => self.submit_and_print(&text).await,
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    fn selected(&self) -> AgentProfile {
        self.session.selected_agent()
    }

    fn handle_command(&self, cmd: LocalCommand) -> bool {
        match cmd {
            LocalCommand::Agents => ui::print_agents(&self.session.agents()),
            LocalCommand::Config => {
                let endpoints: Vec<(String, String)> = self
                    .session
                    .router()
                    .endpoints()
                    .iter()
                    .map(|(id, path)| (id.to_string(), path.to_string()))
                    .collect();
                ui::print_config(&self.info, &self.selected(), &endpoints);
            }
            LocalCommand::Help => ui::print_help(&self.session.commands()),
            LocalCommand::History => ui::print_history(&self.session.messages()),
            LocalCommand::Palette(term) => ui::print_commands(&self.session.suggest(&term)),
            LocalCommand::Quit => return false,
            LocalCommand::Use(Some(id)) => self.switch_agent(&id),
            LocalCommand::Use(None) => match self.pick_agent() {
                Ok(Some(id)) => self.switch_agent(&id),
                Ok(None) => {}
                Err(e) => ui::print_error(&e.to_string()),
            },
        }
        true
    }

    fn switch_agent(&self, id: &str) {
        match self.session.select_agent(id) {
            Ok(()) => ui::print_agent_switched(&self.selected()),
            Err(e) => ui::print_error(&e.to_string()),
        }
    }

    /// Opens a picker over the roster. `None` when the user backs out.
    fn pick_agent(&self) -> Result<Option<String>> {
        let agents = self.session.agents();
        let options: Vec<String> = agents
            .iter()
            .map(|a| format!("{} - {}", a.id, a.display_name))
            .collect();
        let cursor = agents.iter().position(|a| a.is_selected).unwrap_or(0);

        let selection = answered(
            Select::new("Agent:", options)
                .with_starting_cursor(cursor)
                .prompt(),
        )?;
        Ok(selection.and_then(|s| s.split(" - ").next().map(ToString::to_string)))
    }

    /// Runs one turn, cancelling it on Ctrl+C.
    async fn submit_and_print(&self, text: &str) {
        self.printer.begin(&responder_name(&self.session, text));

        let submit = self.session.submit(text);
        tokio::pin!(submit);
        let outcome = loop {
            tokio::select! {
                outcome = &mut submit => break outcome,
                signal = tokio::signal::ctrl_c() => {
                    if signal.is_err() {
                        break (&mut submit).await;
                    }
                    if self.session.cancel() {
                        status!("\n{}", Style::warning("Cancelling..."));
                    }
                }
            }
        };

        let printed = self.printer.finish();
        match outcome {
            TurnOutcome::Replied(_) => {
                println!();
                println!();
            }
            TurnOutcome::Failed(entry) => {
                if printed {
                    println!();
                }
                eprintln!("{}", Style::error(entry.content()));
                eprintln!();
            }
            TurnOutcome::Busy => {
                crate::warn!("{}", Style::warning("A reply is still streaming."));
            }
            TurnOutcome::Ignored => {}
        }
    }
}

/// Name of the agent that will answer `text`: the one the router sends it
/// to, which is not the selected agent for commands like `/exploitdb`.
fn responder_name(session: &ChatSession, text: &str) -> String {
    let selected = session.selected_agent();
    match session.router().resolve(text, &selected.id) {
        Ok(route) if route.agent_id != selected.id => session
            .agents()
            .into_iter()
            .find(|agent| agent.id == route.agent_id)
            .map_or(route.agent_id, |agent| agent.display_name),
        _ => selected.display_name,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::agent::AgentRoster;
    use crate::session::CommandRouter;
    use crate::transport::{HttpBackend, TransportClient};

    fn session() -> ChatSession {
        let transport = TransportClient::new(Arc::new(HttpBackend::new("http://localhost:5000")));
        ChatSession::new(CommandRouter::builtin(), transport, AgentRoster::builtin()).unwrap()
    }

    #[test]
    fn test_responder_is_the_routed_agent() {
        let session = session();
        assert_eq!(responder_name(&session, "what is new?"), "Agent Theta");
        assert_eq!(responder_name(&session, "/exploitdb apache"), "Agent PI");
        assert_eq!(responder_name(&session, "/search log4j"), "search");

        session.select_agent("epsilon").unwrap();
        assert_eq!(responder_name(&session, "/cve CVE-2021-44228"), "Agent Theta");
        assert_eq!(responder_name(&session, "scan this host"), "Agent Epsilon");
    }
}
