//! Command table listing handler.

use anyhow::Result;

use crate::chat::ui;
use crate::config::{ConfigManager, ResolveOptions, resolve_config};

/// Prints the merged command table, filtered through the palette when a
/// term is given.
pub fn print_commands(term: Option<&str>) -> Result<()> {
    let file = ConfigManager::new()?.load_or_default()?;
    let resolved = resolve_config(&ResolveOptions::default(), &file)?;

    let commands: Vec<_> = resolved
        .router
        .commands()
        .suggest(term.unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    ui::print_commands(&commands);
    Ok(())
}
