//! Subcommand implementations.

/// Agent listing command handler.
pub mod agents;

/// Chat mode command handler.
pub mod chat;

/// Command table listing handler.
pub mod commands;

/// Configure command handler.
pub mod configure;
