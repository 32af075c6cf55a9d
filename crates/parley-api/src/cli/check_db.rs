//! Database connectivity check.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use parley_core::conversation::repository::ConversationRepository;
use parley_infra::sqlite::conversation::SqliteConversationRepository;
use parley_infra::sqlite::pool::{DatabasePool, mask_database_url};
use parley_types::config::ParleyConfig;

use crate::state::database_url;

/// Open the database, apply migrations, and report the outcome.
///
/// The URL is printed with any password masked. Returns an error (and so a
/// non-zero exit) when the database cannot be opened.
pub async fn check_db(config: &ParleyConfig, data_dir: &Path, json: bool) -> Result<()> {
    tokio::fs::create_dir_all(data_dir).await?;
    let url = database_url(config, data_dir);
    let masked = mask_database_url(&url);

    if !json {
        println!();
        println!("  Connecting to {}", style(&masked).cyan());
    }

    let pool = DatabasePool::new(&url)
        .await
        .with_context(|| format!("failed to open database at {masked}"))?;
    let repo = SqliteConversationRepository::new(pool.clone());
    let conversation = repo.find().await?;
    let message_count = repo.message_count().await?;
    pool.close().await;

    tracing::info!(database = %masked, message_count, "Database check passed");

    if json {
        let output = serde_json::json!({
            "ok": true,
            "database_url": masked,
            "conversation_id": conversation.map(|c| c.id.to_string()),
            "message_count": message_count,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("  {} Database reachable and migrated", style("✓").green().bold());
    match conversation {
        Some(c) => println!(
            "  Conversation {} with {} messages",
            style(c.id).dim(),
            message_count
        ),
        None => println!("  {}", style("No conversation yet").dim()),
    }
    println!();
    Ok(())
}
