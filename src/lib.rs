//! # agentchat - Streaming Security Agent Chat
//!
//! `agentchat` talks to a family of security research agents over a
//! streaming HTTP backend. Messages are routed by slash command or by the
//! selected agent, replies arrive as `data: ` event lines and are shown as
//! they stream in.
//!
//! ## Quick Start
//!
//! ```bash
//! # Chat with the default agent
//! agentchat
//!
//! # Start with another agent against a remote backend
//! agentchat --agent epsilon --base-url https://intel.example.com
//!
//! # Look up commands
//! agentchat commands forensics
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/agentchat/config.toml`:
//!
//! ```toml
//! [agentchat]
//! base_url = "http://localhost:5000"
//! agent = "theta"
//! timeout_secs = 300
//!
//! [endpoints]
//! theta = "/theta"
//!
//! [commands."/triage"]
//! agent = "epsilon"
//! description = "Triage a suspicious binary"
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentchat::agent::AgentRoster;
//! use agentchat::session::{ChatSession, CommandRouter, TurnOutcome};
//! use agentchat::transport::{HttpBackend, TransportClient};
//!
//! # async fn demo() -> agentchat::error::Result<()> {
//! let transport = TransportClient::new(Arc::new(HttpBackend::new("http://localhost:5000")));
//! let session = ChatSession::new(CommandRouter::builtin(), transport, AgentRoster::builtin())?;
//!
//! if let TurnOutcome::Replied(reply) = session.submit("/cve CVE-2021-44228").await {
//!     println!("{}", reply.content());
//! }
//! # Ok(())
//! # }
//! ```

/// Agent roster, command table and endpoint table.
pub mod agent;

/// Interactive chat mode.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and resolution.
pub mod config;

/// Engine error taxonomy.
pub mod error;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities.
pub mod paths;

/// Routing, turn state machine and transcript.
pub mod session;

/// Streaming HTTP transport and event-line decoding.
pub mod transport;

/// Terminal UI components (spinner, colors).
pub mod ui;
