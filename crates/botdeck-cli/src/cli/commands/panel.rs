//! Panel subcommands that hit authenticated endpoints.

use std::sync::Arc;

use anyhow::Result;
use botdeck_core::config::Config;

use super::{authed_session, map_expired};

pub async fn stats(config: &Config) -> Result<()> {
    let mut session = authed_session(config)?;
    let api = Arc::clone(session.api());
    let stats = api.stats().await.map_err(|e| map_expired(&mut session, e))?;

    println!("total users:     {}", stats.total_users);
    println!("new users today: {}", stats.new_users_today);
    println!("messages today:  {}", stats.messages_today);
    println!("commands today:  {}", stats.commands_today);
    println!("active sessions: {}", stats.active_sessions);
    println!("blocked users:   {}", stats.blocked_users);
    if !stats.top_commands.is_empty() {
        println!();
        println!("top commands:");
        for cmd in &stats.top_commands {
            println!("  {:<20} {}", cmd.name, cmd.count);
        }
    }
    Ok(())
}

pub async fn broadcast_list(config: &Config) -> Result<()> {
    let mut session = authed_session(config)?;
    let api = Arc::clone(session.api());
    let history = api
        .broadcasts()
        .await
        .map_err(|e| map_expired(&mut session, e))?;

    if history.is_empty() {
        println!("No broadcasts yet.");
        return Ok(());
    }
    for broadcast in &history {
        println!(
            "{}  [{}]  sent {} / failed {}  {}",
            broadcast.created_at,
            broadcast.status,
            broadcast.sent_count,
            broadcast.failed_count,
            broadcast.text
        );
    }
    Ok(())
}

pub async fn broadcast_send(config: &Config, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Broadcast text must not be empty.");
    }

    let mut session = authed_session(config)?;
    let api = Arc::clone(session.api());
    let receipt = api
        .send_broadcast(text)
        .await
        .map_err(|e| map_expired(&mut session, e))?;

    println!(
        "Broadcast {}: sent {}, failed {} ({})",
        receipt.broadcast_id, receipt.sent_count, receipt.failed_count, receipt.status
    );
    Ok(())
}
