mod manager;

pub use manager::{
    AgentchatConfig, CommandConfig, ConfigFile, ConfigManager, DEFAULT_BASE_URL, ResolveOptions,
    ResolvedConfig, resolve_config,
};
