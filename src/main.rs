use anyhow::Result;
use clap::Parser;

use agentchat::cli::commands::{agents, chat, commands, configure};
use agentchat::cli::{Args, Command};
use agentchat::config::ResolveOptions;
use agentchat::output::{self, OutputConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.quiet,
        no_color: args.no_color || std::env::var("NO_COLOR").is_ok(),
        verbose: args.verbose,
    });
    output::init_tracing();

    let options = ResolveOptions {
        base_url: args.base_url,
        agent: args.agent,
        timeout_secs: args.timeout_secs,
    };

    match args.command {
        Some(Command::Agents) => {
            agents::print_agents(&options)?;
        }
        Some(Command::Commands { term }) => {
            commands::print_commands(term.as_deref())?;
        }
        Some(Command::Configure { show }) => {
            configure::run_configure(show)?;
        }
        None => {
            chat::run_chat(options).await?;
        }
    }

    Ok(())
}
