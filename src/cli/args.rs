use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agentchat")]
#[command(about = "Streaming chat with security research agents")]
#[command(version)]
pub struct Args {
    /// Agent to start with (e.g., theta, epsilon, darkbert, deepseek)
    #[arg(short = 'a', long)]
    pub agent: Option<String>,

    /// Backend base URL
    #[arg(short = 'u', long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long = "timeout")]
    pub timeout_secs: Option<u64>,

    /// Suppress status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List agents and their specializations
    Agents,
    /// List agent commands, optionally filtered by a search term
    Commands {
        /// Text to match against command names and descriptions
        term: Option<String>,
    },
    /// Configure agentchat defaults
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
