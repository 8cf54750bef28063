use anyhow::{Context, Result};
use std::sync::Arc;

use crate::chat::{ChatRepl, SessionInfo};
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::session::ChatSession;
use crate::transport::{HttpBackend, TransportClient};

pub async fn run_chat(options: ResolveOptions) -> Result<()> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;
    let resolved = resolve_config(&options, &file_config)?;

    let (session, info) = build_session(resolved)?;
    ChatRepl::new(Arc::new(session), info).run().await
}

/// Wires a session to the HTTP backend described by `resolved`.
pub fn build_session(resolved: ResolvedConfig) -> Result<(ChatSession, SessionInfo)> {
    tracing::debug!(
        base_url = %resolved.base_url,
        agent = %resolved.agent(),
        timeout = ?resolved.timeout,
        "starting session"
    );

    let backend = HttpBackend::new(resolved.base_url.clone());
    let transport = TransportClient::new(Arc::new(backend)).with_timeout(resolved.timeout);
    let session = ChatSession::new(resolved.router, transport, resolved.roster)
        .context("Failed to start chat session")?;

    let info = SessionInfo {
        base_url: resolved.base_url,
        timeout: resolved.timeout,
    };
    Ok((session, info))
}
