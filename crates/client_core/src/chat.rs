use anyhow::{bail, Context, Result};
use shared::{
    domain::{ChatMessage, Conversation, UserId},
    protocol::NewChatMessage,
};
use tracing::debug;

use crate::state::EventSession;

pub fn total_unread(conversations: &[Conversation]) -> u32 {
    conversations.iter().map(|c| c.unread).sum()
}

impl EventSession {
    pub async fn chat_thread(&self, other: &UserId) -> Result<Vec<ChatMessage>> {
        let event = self.event().await?;
        self.api
            .messages(&event.id, other)
            .await
            .with_context(|| format!("failed to load messages with {other}"))
    }

    /// Sends a direct message and returns the refreshed thread.
    pub async fn send_chat_message(&self, other: &UserId, text: &str) -> Result<Vec<ChatMessage>> {
        if text.trim().is_empty() {
            bail!("message must not be empty");
        }
        let (event, user) = self.context().await?;
        let message = NewChatMessage {
            sender: user.id.clone(),
            receiver: other.clone(),
            message: text.to_string(),
            event: event.id.clone(),
            read_by: vec![user.id.clone()],
        };
        self.api
            .send_message(&message)
            .await
            .with_context(|| format!("failed to send message to {other}"))?;
        debug!(receiver = %other, "message sent");
        self.chat_thread(other).await
    }
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
