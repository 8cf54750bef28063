use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::prompts;
use crate::error::{ChatError, Result};

/// A slash command bound to an agent and an optional system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Leading token, including the `/`.
    pub trigger: String,
    /// Agent whose endpoint receives the message.
    pub agent: String,
    /// Shown in the palette and in `agentchat commands`.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Command {
    pub fn new(trigger: &str, agent: &str, description: &str, system_prompt: Option<&str>) -> Self {
        Self {
            trigger: trigger.to_string(),
            agent: agent.to_string(),
            description: description.to_string(),
            system_prompt: system_prompt.map(ToString::to_string),
        }
    }
}

/// Read-only command table, keyed by trigger, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    /// # Errors
    ///
    /// Fails on a trigger that does not start with `/`, contains whitespace,
    /// or appears twice.
    pub fn new(commands: Vec<Command>) -> Result<Self> {
        for (i, command) in commands.iter().enumerate() {
            validate_trigger(&command.trigger)?;
            if commands[..i].iter().any(|c| c.trigger == command.trigger) {
                return Err(ChatError::Config(format!(
                    "duplicate command '{}'",
                    command.trigger
                )));
            }
        }
        Ok(Self { commands })
    }

    /// The reference security commands plus `/search`.
    pub fn builtin() -> Self {
        Self {
            commands: builtin_commands(),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, trigger: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.trigger == trigger)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns a table with `overrides` applied: a known trigger is replaced
    /// in place, a new one is appended.
    ///
    /// # Errors
    ///
    /// Fails if an override has an invalid trigger.
    pub fn merged(&self, overrides: Vec<Command>) -> Result<Self> {
        let mut commands = self.commands.clone();
        for command in overrides {
            validate_trigger(&command.trigger)?;
            match commands.iter_mut().find(|c| c.trigger == command.trigger) {
                Some(existing) => *existing = command,
                None => commands.push(command),
            }
        }
        Ok(Self { commands })
    }

    /// Palette filter.
    ///
    /// A bare `/` or empty term lists everything. Otherwise commands whose
    /// trigger or description contains the term (case-insensitive) are
    /// returned; when nothing matches the whole table is returned so the
    /// palette never goes blank.
    pub fn suggest(&self, term: &str) -> Vec<&Command> {
        let term = term.trim().trim_start_matches('/').to_lowercase();
        if term.is_empty() {
            return self.commands.iter().collect();
        }

        let matches: Vec<&Command> = self
            .commands
            .iter()
            .filter(|c| {
                c.trigger.to_lowercase().contains(&term)
                    || c.description.to_lowercase().contains(&term)
            })
            .collect();

        if matches.is_empty() {
            self.commands.iter().collect()
        } else {
            matches
        }
    }
}

fn validate_trigger(trigger: &str) -> Result<()> {
    if trigger.len() < 2 || !trigger.starts_with('/') {
        return Err(ChatError::Config(format!(
            "command '{trigger}' must start with '/' followed by a name"
        )));
    }
    if trigger.chars().any(char::is_whitespace) {
        return Err(ChatError::Config(format!(
            "command '{trigger}' must not contain whitespace"
        )));
    }
    Ok(())
}

/// Agent id to endpoint path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointTable(BTreeMap<String, String>);

/// Pseudo-agent reached only through `/search`.
pub const SEARCH_AGENT: &str = "search";

impl EndpointTable {
    pub fn builtin() -> Self {
        Self(
            [
                ("theta", "/theta"),
                ("epsilon", "/epsilon"),
                ("darkbert", "/darkbert"),
                ("deepseek", "/deepseek"),
                (SEARCH_AGENT, "/search"),
            ]
            .into_iter()
            .map(|(id, path)| (id.to_string(), path.to_string()))
            .collect(),
        )
    }

    pub fn get(&self, agent: &str) -> Option<&str> {
        self.0.get(agent).map(String::as_str)
    }

    pub fn insert(&mut self, agent: impl Into<String>, path: impl Into<String>) {
        self.0.insert(agent.into(), path.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for EndpointTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn builtin_commands() -> Vec<Command> {
    vec![
        Command::new(
            "/cve",
            "theta",
            "Get details of a specific CVE: severity, summary, and affected systems",
            Some(prompts::CVE),
        ),
        Command::new(
            "/exploitdb",
            "darkbert",
            "Search ExploitDB for public exploits and PoCs",
            Some(prompts::EXPLOITDB),
        ),
        Command::new(
            "/ioc",
            "theta",
            "Fetch Indicators of Compromise for malware, tools, or APTs",
            Some(prompts::IOC),
        ),
        Command::new(
            "/pentest",
            "epsilon",
            "Provides methodology and tools for penetration testing",
            Some(prompts::PENTEST),
        ),
        Command::new(
            "/privsec",
            "epsilon",
            "Lists privilege escalation techniques for a given OS",
            Some(prompts::PRIVSEC),
        ),
        Command::new(
            "/ir",
            "theta",
            "Incident Response playbook for handling specific threats",
            Some(prompts::IR),
        ),
        Command::new(
            "/dfir",
            "theta",
            "Digital Forensics & IR steps for breach investigations",
            Some(prompts::DFIR),
        ),
        Command::new(
            "/soctools",
            "theta",
            "Lists essential SOC tools for monitoring and defense",
            Some(prompts::SOCTOOLS),
        ),
        Command::new(
            "/search",
            SEARCH_AGENT,
            "Search the internet with Agent PI",
            None,
        ),
    ]
}
