//! Chat mode UI components.

use std::time::Duration;

use crate::agent::{Agent, AgentProfile, Command};
use crate::error::format_duration;
use crate::session::{Message, Role};
use crate::ui::Style;

use super::command::LOCAL_COMMANDS;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connection settings shown by `/config`.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub base_url: String,
    pub timeout: Duration,
}

pub fn print_header(agent: &AgentProfile) {
    println!(
        "{} {} - Security Agent Chat",
        Style::header("agentchat"),
        Style::version(format!("v{VERSION}"))
    );
    println!(
        "{} {} {}",
        Style::label("Talking to"),
        Style::agent(&agent.display_name),
        Style::secondary(format!("({})", agent.id))
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(info: &SessionInfo, agent: &AgentProfile, endpoints: &[(String, String)]) {
    println!("{}", Style::header("Configuration"));
    println!("  {}     {}", Style::label("agent"), Style::agent(&agent.id));
    println!("  {}  {}", Style::label("base_url"), Style::value(&info.base_url));
    println!(
        "  {}   {}",
        Style::label("timeout"),
        Style::value(format_duration(&info.timeout))
    );
    println!("  {}", Style::label("endpoints"));
    for (id, path) in endpoints {
        println!("    {id:<10} {}", Style::secondary(path));
    }
    println!();
}

pub fn print_help(commands: &[Command]) {
    println!("{}", Style::header("Available commands"));
    for (cmd, desc) in LOCAL_COMMANDS {
        println!("  {}  {}", Style::command(format!("{cmd:<10}")), Style::secondary(desc));
    }
    println!();
    print_commands(commands);
    println!(
        "{}",
        Style::hint("Anything else is sent to the selected agent. Ctrl+C cancels a reply.")
    );
    println!();
}

/// Agent command table, as shown by `/help`, `/palette` and `agentchat commands`.
pub fn print_commands(commands: &[Command]) {
    println!("{}", Style::header("Agent commands"));
    for command in commands {
        println!(
            "  {}  {} {}",
            Style::command(format!("{:<10}", command.trigger)),
            Style::secondary(&command.description),
            Style::agent(format!("[{}]", command.agent))
        );
    }
    println!();
}

pub fn print_agents(agents: &[Agent]) {
    println!("{}", Style::header("Agents"));
    for agent in agents {
        let marker = if agent.is_selected { "●" } else { " " };
        println!(
            "{} {} {}",
            Style::success(marker),
            Style::agent(format!("{:<10}", agent.id)),
            agent.display_name
        );
        println!("    {}", Style::secondary(&agent.description));
        if !agent.specializations.is_empty() {
            println!("    {}", Style::hint(agent.specializations.join(", ")));
        }
    }
    println!();
}

pub fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", Style::secondary("No messages yet."));
        println!();
        return;
    }

    for message in messages {
        let who = match (message.role(), message.model_id()) {
            (Role::User, _) => Style::label("you"),
            (Role::Assistant, Some(model)) => Style::agent(model),
            (Role::Assistant, None) => Style::agent("assistant"),
        };
        let time = message.timestamp().format("%H:%M:%S");
        println!("{} {who}", Style::secondary(time));
        if message.is_error() {
            println!("  {}", Style::error(message.content()));
        } else {
            for line in message.content().lines() {
                println!("  {line}");
            }
        }
    }
    println!();
}

pub fn print_agent_switched(agent: &AgentProfile) {
    println!(
        "{} Now talking to {} {}",
        Style::success("✓"),
        Style::agent(&agent.display_name),
        Style::secondary(format!("({})", agent.id))
    );
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
