//! Agent listing command handler.

use anyhow::Result;

use crate::chat::ui;
use crate::config::{ConfigManager, ResolveOptions, resolve_config};

/// Prints the agent roster, marking the configured default agent.
pub fn print_agents(options: &ResolveOptions) -> Result<()> {
    let file = ConfigManager::new()?.load_or_default()?;
    let resolved = resolve_config(options, &file)?;

    ui::print_agents(&resolved.roster.agents());
    Ok(())
}
