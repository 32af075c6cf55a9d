//! Conversation commands: ask, history, clear.

use anyhow::Result;
use console::style;
use tokio_util::sync::CancellationToken;

use parley_types::conversation::{Message, MessageRole};

use crate::state::AppState;

/// Run one exchange and print the assistant reply.
///
/// Ctrl+C cancels the in-flight provider call; nothing is persisted then.
pub async fn ask(state: &AppState, message: &str, json: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let result = state.conversations.append_exchange(message, &cancel).await;
    watcher.abort();
    let exchange = result?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "messages": exchange.conversation.messages,
            "lastMessage": {
                "role": exchange.last_message.role,
                "content": exchange.last_message.content,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    print_message(&exchange.last_message);
    println!();
    Ok(())
}

/// Print every message in the conversation.
pub async fn history(state: &AppState, json: bool) -> Result<()> {
    let conversation = state.conversations.get_or_create().await?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "messages": conversation.messages,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if conversation.messages.is_empty() {
        println!();
        println!("  {}", style("No messages yet.").dim());
        println!();
        return Ok(());
    }

    println!();
    for message in &conversation.messages {
        print_message(message);
    }
    println!(
        "  {}",
        style(format!(
            "{} messages, last updated {}",
            conversation.messages.len(),
            conversation.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
        .dim()
    );
    println!();
    Ok(())
}

/// Reset the conversation.
pub async fn clear(state: &AppState, json: bool) -> Result<()> {
    state.conversations.reset().await?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "message": "Chat history cleared",
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("  {} Chat history cleared", style("✓").green().bold());
        println!();
    }
    Ok(())
}

fn print_message(message: &Message) {
    let label = match message.role {
        MessageRole::User => style("you").cyan().bold(),
        MessageRole::Assistant => style("assistant").magenta().bold(),
    };
    println!(
        "  {} {}",
        label,
        style(message.timestamp.format("%H:%M:%S")).dim()
    );
    for line in message.content.lines() {
        println!("    {line}");
    }
    println!();
}
