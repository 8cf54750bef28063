//! Configure command handler for editing default settings.

use anyhow::{Context, Result, bail};
use inquire::{Select, Text};

use crate::agent::AgentRoster;
use crate::config::{AgentchatConfig, ConfigFile, ConfigManager, DEFAULT_BASE_URL};
use crate::error::format_duration;
use crate::transport::{DEFAULT_TIMEOUT, MAX_TIMEOUT};
use crate::ui::{Style, answered};

/// Runs the configure command.
///
/// With `show`, prints the stored defaults. Otherwise prompts for the
/// default agent, base URL and timeout and saves them.
pub fn run_configure(show: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_or_default()?;
    print_current_defaults(&config, &manager);
    if show {
        return Ok(());
    }

    let Some(defaults) = prompt_defaults(&config.agentchat)? else {
        println!();
        return Ok(());
    };
    config.agentchat = defaults;
    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

/// Walks through the three prompts. `None` if the user backs out of any.
fn prompt_defaults(current: &AgentchatConfig) -> Result<Option<AgentchatConfig>> {
    let Some(agent) = select_agent(current.agent.as_deref())? else {
        return Ok(None);
    };
    let Some(base_url) = input_base_url(current.base_url.as_deref())? else {
        return Ok(None);
    };
    let Some(timeout_secs) = input_timeout(current.timeout_secs)? else {
        return Ok(None);
    };

    Ok(Some(AgentchatConfig {
        base_url: Some(base_url),
        agent: Some(agent),
        timeout_secs: Some(timeout_secs),
    }))
}

fn print_current_defaults(config: &ConfigFile, manager: &ConfigManager) {
    let not_set = || Style::secondary("(not set)");

    println!("{}", Style::header("Current defaults"));
    println!(
        "  {}     {}",
        Style::label("agent"),
        config
            .agentchat
            .agent
            .as_deref()
            .map_or_else(not_set, Style::agent)
    );
    println!(
        "  {}  {}",
        Style::label("base_url"),
        config
            .agentchat
            .base_url
            .as_deref()
            .map_or_else(not_set, Style::value)
    );
    println!(
        "  {}   {}",
        Style::label("timeout"),
        config
            .agentchat
            .timeout_secs
            .map_or_else(not_set, |secs| Style::value(format!("{secs}s")))
    );
    if !config.endpoints.is_empty() {
        println!("  {}", Style::label("endpoints"));
        for (agent, path) in &config.endpoints {
            println!("    {agent:<10} {}", Style::secondary(path));
        }
    }
    if !config.commands.is_empty() {
        println!("  {}", Style::label("commands"));
        for (trigger, command) in &config.commands {
            println!(
                "    {} {}",
                Style::command(format!("{trigger:<10}")),
                Style::agent(format!("[{}]", command.agent))
            );
        }
    }
    println!(
        "  {}      {}",
        Style::label("file"),
        Style::secondary(manager.config_path().display().to_string())
    );
    println!();
}

fn select_agent(default: Option<&str>) -> Result<Option<String>> {
    let roster = AgentRoster::builtin();
    let options: Vec<String> = roster
        .profiles()
        .iter()
        .map(|p| format!("{} - {}", p.id, p.display_name))
        .collect();

    let default_index = default
        .and_then(|d| roster.profiles().iter().position(|p| p.id == d))
        .unwrap_or(0);

    let Some(selection) = answered(
        Select::new("Default agent:", options)
            .with_starting_cursor(default_index)
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    // "id - Name"
    let id = selection.split(" - ").next().unwrap_or(&selection);
    Ok(Some(id.to_string()))
}

fn input_base_url(default: Option<&str>) -> Result<Option<String>> {
    let Some(url) = answered(
        Text::new("Backend base URL:")
            .with_default(default.unwrap_or(DEFAULT_BASE_URL))
            .prompt(),
    )?
    else {
        return Ok(None);
    };
    let url = url.trim();

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Base URL must start with http:// or https://");
    }
    Ok(Some(url.trim_end_matches('/').to_string()))
}

fn input_timeout(default: Option<u64>) -> Result<Option<u64>> {
    let default = default.unwrap_or(DEFAULT_TIMEOUT.as_secs()).to_string();
    let help = format!("Default is {}", format_duration(&DEFAULT_TIMEOUT));
    let Some(secs) = answered(
        Text::new("Request timeout (seconds):")
            .with_default(&default)
            .with_help_message(&help)
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    let secs: u64 = secs
        .trim()
        .parse()
        .with_context(|| format!("Invalid timeout '{}'", secs.trim()))?;
    if secs == 0 {
        bail!("Timeout must be at least 1 second");
    }
    if secs > MAX_TIMEOUT.as_secs() {
        bail!("Timeout must be at most {}", format_duration(&MAX_TIMEOUT));
    }
    Ok(Some(secs))
}
