use crate::agent::{CommandTable, EndpointTable};
use crate::error::{ChatError, Result};

/// Where a message goes and with which system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub agent_id: String,
    pub endpoint: String,
    pub system_prompt: Option<String>,
    /// Trigger of the matched command, if any.
    pub command: Option<String>,
}

/// Resolves user input to a [`Route`].
#[derive(Debug, Clone)]
pub struct CommandRouter {
    commands: CommandTable,
    endpoints: EndpointTable,
}

impl CommandRouter {
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if a command targets an agent with no
    /// endpoint.
    pub fn new(commands: CommandTable, endpoints: EndpointTable) -> Result<Self> {
        if let Some(orphan) = commands.iter().find(|c| endpoints.get(&c.agent).is_none()) {
            return Err(ChatError::Config(format!(
                "command '{}' targets agent '{}' which has no endpoint",
                orphan.trigger, orphan.agent
            )));
        }
        Ok(Self {
            commands,
            endpoints,
        })
    }

    pub fn builtin() -> Self {
        Self {
            commands: CommandTable::builtin(),
            endpoints: EndpointTable::builtin(),
        }
    }

    /// Routes `input`.
    ///
    /// A leading `/token` that exactly matches a command goes to that
    /// command's agent with its system prompt. Anything else, including an
    /// unrecognized `/token`, goes to `selected_agent_id` without a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::UnknownAgent`] if the fallback agent has no
    /// endpoint.
    pub fn resolve(&self, input: &str, selected_agent_id: &str) -> Result<Route> {
        if input.starts_with('/') {
            let token = input.split_whitespace().next().unwrap_or(input);
            if let Some(command) = self.commands.get(token) {
                tracing::debug!(trigger = %command.trigger, agent = %command.agent, "routed by command");
                return self.route_to(&command.agent, command.system_prompt.clone(), Some(token));
            }
            tracing::debug!(%token, "unrecognized command, using selected agent");
        }

        self.route_to(selected_agent_id, None, None)
    }

    fn route_to(
        &self,
        agent_id: &str,
        system_prompt: Option<String>,
        command: Option<&str>,
    ) -> Result<Route> {
        let endpoint = self
            .endpoints
            .get(agent_id)
            .ok_or_else(|| ChatError::UnknownAgent(agent_id.to_string()))?;

        Ok(Route {
            agent_id: agent_id.to_string(),
            endpoint: endpoint.to_string(),
            system_prompt,
            command: command.map(ToString::to_string),
        })
    }

    pub const fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub const fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }
}
