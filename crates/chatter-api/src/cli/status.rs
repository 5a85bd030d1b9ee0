//! System status command.

use anyhow::Result;
use console::style;
use serde::Serialize;

use chatter_core::repository::conversation::ConversationRepository;
use chatter_core::repository::user::UserRepository;

use crate::state::AppState;

/// Record counts and storage details.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub data_dir: String,
    pub storage: String,
    pub users: u64,
    pub conversations: u64,
    pub messages: u64,
}

/// Gather counts from the configured storage backend.
pub async fn collect(state: &AppState) -> Result<StatusReport> {
    let conversations = state.chat_service.conversation_repo();

    Ok(StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        data_dir: state.data_dir.display().to_string(),
        storage: state.config.storage.to_string(),
        users: state.auth_service.user_repo().count_users().await?,
        conversations: conversations.count_conversations().await?,
        messages: conversations.count_all_messages().await?,
    })
}

/// Display the status dashboard.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let report = collect(state).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("  {} Chatter v{}", style("⚡").bold(), report.version);
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Backend:  {}", style(&report.storage).cyan());
    println!("  Data dir: {}", style(&report.data_dir).dim());
    println!();

    println!("  {}", style("── Records ──").dim());
    println!("  Users:         {}", style(report.users).bold());
    println!("  Conversations: {}", style(report.conversations).bold());
    println!("  Messages:      {}", style(report.messages).bold());
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_state;

    #[tokio::test]
    async fn test_collect_counts_records() {
        let state = memory_state();
        let user = state.auth_service.register("ada", "password123").await.unwrap();
        let conversation = state
            .chat_service
            .create_conversation(&user.id, None)
            .await
            .unwrap();
        state
            .chat_service
            .send_message(&user.id, &conversation.id, "hello")
            .await
            .unwrap();

        let report = collect(&state).await.unwrap();
        assert_eq!(report.users, 1);
        assert_eq!(report.conversations, 1);
        assert_eq!(report.messages, 2);
        assert_eq!(report.storage, "memory");
    }
}
