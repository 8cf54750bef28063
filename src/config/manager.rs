use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::agent::{AgentRoster, Command, CommandTable, DEFAULT_AGENT, EndpointTable};
use crate::paths;
use crate::session::CommandRouter;
use crate::error::format_duration;
use crate::transport::{DEFAULT_TIMEOUT, MAX_TIMEOUT};

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default settings in the `[agentchat]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentchatConfig {
    /// Base URL the endpoint paths are joined to.
    pub base_url: Option<String>,
    /// Agent selected at startup.
    pub agent: Option<String>,
    /// Request budget in seconds.
    pub timeout_secs: Option<u64>,
}

/// A command added or overridden in `[commands."/name"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Agent whose endpoint receives the message.
    pub agent: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/agentchat/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub agentchat: AgentchatConfig,
    /// Endpoint paths keyed by agent id, merged over the built-in table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,
    /// Commands keyed by trigger, merged over the built-in table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, CommandConfig>,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub router: CommandRouter,
    /// Roster with the startup agent selected.
    pub roster: AgentRoster,
}

impl ResolvedConfig {
    pub fn agent(&self) -> &str {
        self.roster.selected_id()
    }
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub base_url: Option<String>,
    pub agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// Priority: CLI option, then config file, then built-in default.
///
/// # Errors
///
/// Returns an error if the base URL is not http(s), the agent is unknown,
/// the timeout is zero or longer than [`MAX_TIMEOUT`], or the
/// command/endpoint tables are inconsistent.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let base_url = options
        .base_url
        .as_ref()
        .or(config_file.agentchat.base_url.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        bail!(
            "Invalid base URL '{base_url}'\n\n\
             The base URL must start with http:// or https://"
        );
    }

    let timeout = match options.timeout_secs.or(config_file.agentchat.timeout_secs) {
        Some(0) => bail!("Invalid timeout: must be at least 1 second"),
        Some(secs) if secs > MAX_TIMEOUT.as_secs() => bail!(
            "Invalid timeout {secs}s: must be at most {}",
            format_duration(&MAX_TIMEOUT)
        ),
        Some(secs) => Duration::from_secs(secs),
        None => DEFAULT_TIMEOUT,
    };

    let mut endpoints = EndpointTable::builtin();
    for (agent, path) in &config_file.endpoints {
        if !path.starts_with('/') {
            bail!("Invalid endpoint '{path}' for agent '{agent}': paths must start with '/'");
        }
        endpoints.insert(agent.clone(), path.clone());
    }

    let overrides = config_file
        .commands
        .iter()
        .map(|(trigger, c)| Command {
            trigger: trigger.clone(),
            agent: c.agent.clone(),
            description: c.description.clone().unwrap_or_default(),
            system_prompt: c.system_prompt.clone(),
        })
        .collect();
    let commands = CommandTable::builtin()
        .merged(overrides)
        .context("Invalid command in config file")?;

    let router = CommandRouter::new(commands, endpoints).context("Invalid command in config file")?;

    let agent = options
        .agent
        .as_ref()
        .or(config_file.agentchat.agent.as_ref())
        .map_or(DEFAULT_AGENT, String::as_str);

    let builtin = AgentRoster::builtin();
    let roster = builtin.select(agent).map_err(|_| {
        let available: Vec<&str> = builtin
            .profiles()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        anyhow::anyhow!(
            "Agent '{agent}' not found\n\n\
             Available agents:\n  \
             - {}\n\n\
             Run 'agentchat agents' for details",
            available.join("\n  - ")
        )
    })?;

    Ok(ResolvedConfig {
        base_url,
        timeout,
        router,
        roster,
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/agentchat/config.toml`
    /// or `~/.config/agentchat/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    /// Manager for an explicit file, e.g. `--config <path>`.
    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        Ok(())
    }

    /// Loads the file, falling back to defaults when it is missing.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::agent::prompts;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(temp_dir.path().join("config.toml"))
    }

    fn create_test_config() -> ConfigFile {
        let mut endpoints = BTreeMap::new();
        endpoints.insert("theta".to_string(), "/v2/theta".to_string());

        let mut commands = BTreeMap::new();
        commands.insert(
            "/triage".to_string(),
            CommandConfig {
                agent: "epsilon".to_string(),
                description: Some("Triage a suspicious binary".to_string()),
                system_prompt: Some("Be brief".to_string()),
            },
        );

        ConfigFile {
            agentchat: AgentchatConfig {
                base_url: Some("http://intel.local:8080".to_string()),
                agent: Some("epsilon".to_string()),
                timeout_secs: Some(60),
            },
            endpoints,
            commands,
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let config = create_test_config();
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        assert!(manager.load().is_err());
        assert_eq!(manager.load_or_default().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_load_or_default_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        fs::write(manager.config_path(), "[agentchat\nbase_url = 1").unwrap();

        let err = manager.load_or_default().unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_parse_toml_layout() {
        let config: ConfigFile = toml::from_str(
            r#"
            [agentchat]
            base_url = "https://intel.example.com"
            agent = "darkbert"

            [endpoints]
            deepseek = "/cosine"

            [commands."/yara"]
            agent = "epsilon"
            description = "Write a YARA rule"
            "#,
        )
        .unwrap();

        assert_eq!(config.agentchat.agent.as_deref(), Some("darkbert"));
        assert_eq!(config.agentchat.timeout_secs, None);
        assert_eq!(config.endpoints["deepseek"], "/cosine");
        assert!(config.commands["/yara"].system_prompt.is_none());
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve_config(&ResolveOptions::default(), &ConfigFile::default()).unwrap();

        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.agent(), "theta");
        assert_eq!(resolved.timeout, Duration::from_secs(300));
        assert_eq!(resolved.router.commands().len(), CommandTable::builtin().len());
    }

    #[test]
    fn test_resolve_uses_file() {
        let resolved = resolve_config(&ResolveOptions::default(), &create_test_config()).unwrap();

        assert_eq!(resolved.base_url, "http://intel.local:8080");
        assert_eq!(resolved.agent(), "epsilon");
        assert_eq!(resolved.timeout, Duration::from_secs(60));
        assert_eq!(resolved.router.endpoints().get("theta"), Some("/v2/theta"));
        assert_eq!(resolved.router.endpoints().get("epsilon"), Some("/epsilon"));

        let route = resolved.router.resolve("/triage sample.exe", "theta").unwrap();
        assert_eq!(route.agent_id, "epsilon");
        assert_eq!(route.system_prompt.as_deref(), Some("Be brief"));

        // Built-in commands survive the merge.
        let route = resolved.router.resolve("/cve CVE-2023-4872", "epsilon").unwrap();
        assert_eq!(route.endpoint, "/v2/theta");
        assert_eq!(route.system_prompt.as_deref(), Some(prompts::CVE));
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let options = ResolveOptions {
            base_url: Some("https://override.example.com".to_string()),
            agent: Some("deepseek".to_string()),
            timeout_secs: Some(5),
        };
        let resolved = resolve_config(&options, &create_test_config()).unwrap();

        assert_eq!(resolved.base_url, "https://override.example.com");
        assert_eq!(resolved.agent(), "deepseek");
        assert_eq!(resolved.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_resolve_unknown_agent() {
        let options = ResolveOptions {
            agent: Some("seneca".to_string()),
            ..ResolveOptions::default()
        };
        let err = resolve_config(&options, &ConfigFile::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("theta"));
    }

    #[test]
    fn test_resolve_rejects_bad_base_url() {
        let options = ResolveOptions {
            base_url: Some("localhost:5000".to_string()),
            ..ResolveOptions::default()
        };
        let err = resolve_config(&options, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_resolve_rejects_zero_timeout() {
        let options = ResolveOptions {
            timeout_secs: Some(0),
            ..ResolveOptions::default()
        };
        assert!(resolve_config(&options, &ConfigFile::default()).is_err());
    }

    #[test]
    fn test_resolve_timeout_upper_bound() {
        let at_limit = ResolveOptions {
            timeout_secs: Some(MAX_TIMEOUT.as_secs()),
            ..ResolveOptions::default()
        };
        let resolved = resolve_config(&at_limit, &ConfigFile::default()).unwrap();
        assert_eq!(resolved.timeout, MAX_TIMEOUT);

        let over = ResolveOptions {
            timeout_secs: Some(MAX_TIMEOUT.as_secs() + 1),
            ..ResolveOptions::default()
        };
        let err = resolve_config(&over, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_resolve_rejects_command_without_endpoint() {
        let mut config = ConfigFile::default();
        config.commands.insert(
            "/lily".to_string(),
            CommandConfig {
                agent: "lily".to_string(),
                description: None,
                system_prompt: None,
            },
        );
        let err = resolve_config(&ResolveOptions::default(), &config).unwrap_err();
        assert!(format!("{err:#}").contains("no endpoint"));
    }

    #[test]
    fn test_resolve_accepts_command_with_new_endpoint() {
        let mut config = ConfigFile::default();
        config
            .endpoints
            .insert("lily".to_string(), "/lily".to_string());
        config.commands.insert(
            "/lily".to_string(),
            CommandConfig {
                agent: "lily".to_string(),
                description: None,
                system_prompt: None,
            },
        );
        let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();
        assert_eq!(resolved.router.resolve("/lily hi", "theta").unwrap().endpoint, "/lily");
    }

    #[test]
    fn test_resolve_rejects_relative_endpoint() {
        let mut config = ConfigFile::default();
        config
            .endpoints
            .insert("theta".to_string(), "theta".to_string());
        assert!(resolve_config(&ResolveOptions::default(), &config).is_err());
    }
}
