use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ChatError, Result};

/// Static description of a selectable backend agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub display_name: String,
    pub description: String,
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl AgentProfile {
    pub fn new(id: &str, display_name: &str, description: &str, specializations: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            specializations: specializations.iter().map(ToString::to_string).collect(),
        }
    }
}

/// An agent as presented to a picker, with its selection flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub specializations: Vec<String>,
    pub is_selected: bool,
}

/// Immutable snapshot of the agent list plus the one selected id.
///
/// Selecting an agent yields a new snapshot; the flags in [`Agent`] are
/// derived from `selected`, so exactly one agent is ever selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRoster {
    profiles: Arc<[AgentProfile]>,
    selected: String,
}

impl AgentRoster {
    /// Builds a roster with `selected` as the current agent.
    ///
    /// # Errors
    ///
    /// Fails if the list is empty, contains duplicate ids, or does not
    /// contain `selected`.
    pub fn new(profiles: Vec<AgentProfile>, selected: &str) -> Result<Self> {
        if profiles.is_empty() {
            return Err(ChatError::Config("agent roster is empty".to_string()));
        }
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|p| p.id == profile.id) {
                return Err(ChatError::Config(format!(
                    "duplicate agent id '{}'",
                    profile.id
                )));
            }
        }
        if !profiles.iter().any(|p| p.id == selected) {
            return Err(ChatError::UnknownAgent(selected.to_string()));
        }

        Ok(Self {
            profiles: profiles.into(),
            selected: selected.to_string(),
        })
    }

    /// The reference agents, with `theta` selected.
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles().into(),
            selected: DEFAULT_AGENT.to_string(),
        }
    }

    /// Returns a new snapshot with `id` selected.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::UnknownAgent`] if `id` is not in the roster.
    pub fn select(&self, id: &str) -> Result<Self> {
        if !self.contains(id) {
            return Err(ChatError::UnknownAgent(id.to_string()));
        }
        Ok(Self {
            profiles: Arc::clone(&self.profiles),
            selected: id.to_string(),
        })
    }

    pub fn selected_id(&self) -> &str {
        &self.selected
    }

    pub fn selected(&self) -> &AgentProfile {
        self.get(&self.selected)
            .unwrap_or_else(|| &self.profiles[0])
    }

    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn profiles(&self) -> &[AgentProfile] {
        &self.profiles
    }

    /// Agents in roster order with their selection flags.
    pub fn agents(&self) -> Vec<Agent> {
        self.profiles
            .iter()
            .map(|p| Agent {
                id: p.id.clone(),
                display_name: p.display_name.clone(),
                description: p.description.clone(),
                specializations: p.specializations.clone(),
                is_selected: p.id == self.selected,
            })
            .collect()
    }
}

/// Agent selected when nothing else is configured.
pub const DEFAULT_AGENT: &str = "theta";

fn builtin_profiles() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new(
            "theta",
            "Agent Theta",
            "Advanced cybersecurity model specialized in threat analysis and vulnerability assessment",
            &[
                "Advanced Persistent Threats (APT)",
                "Cloud Security",
                "Governance, Risk and Compliance",
                "Network Security",
                "And 25+ other areas",
            ],
        ),
        AgentProfile::new(
            "epsilon",
            "Agent Epsilon",
            "Expert in malware analysis and reverse engineering",
            &[
                "Malware Analysis",
                "Reverse Engineering",
                "Threat Intelligence",
                "Incident Response",
                "Exploit Analysis",
                "Code Analysis",
            ],
        ),
        AgentProfile::new(
            "darkbert",
            "Agent PI",
            "Capable of internet searching",
            &[
                "Dark web intelligence",
                "Credential leaks",
                "Underground markets",
                "Threat actor tracking",
            ],
        ),
        AgentProfile::new(
            "deepseek",
            "Agent Cosine",
            "General AI for your daily go to go",
            &[
                "Web scraping",
                "Real-time intelligence",
                "News aggregation",
                "Technical documentation search",
            ],
        ),
    ]
}
