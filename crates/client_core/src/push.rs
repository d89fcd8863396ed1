use std::{convert::Infallible, str::FromStr};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::protocol::UserPatch;
use tracing::{debug, info};

use crate::state::EventSession;

/// Kind carried in the `type` field of a push payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushKind {
    Chat,
    Meeting,
    Other(String),
}

impl FromStr for PushKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "CHAT" => PushKind::Chat,
            "MEETING" => PushKind::Meeting,
            other => PushKind::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl PushPayload {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("push payload is not valid JSON")
    }

    pub fn kind(&self) -> PushKind {
        match self.kind.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl EventSession {
    /// Refreshes whatever a push message says changed.
    pub async fn handle_push(&self, kind: &PushKind) -> Result<()> {
        match kind {
            PushKind::Chat => {
                self.refresh_conversations().await?;
            }
            PushKind::Meeting => {
                self.refresh_waiting_meetings().await?;
            }
            PushKind::Other(other) => debug!(kind = %other, "ignoring push message"),
        }
        Ok(())
    }

    /// Dispatches a decoded push message on its `type`.
    pub async fn handle_push_payload(&self, payload: &PushPayload) -> Result<()> {
        info!(title = %payload.title, kind = %payload.kind, "push message received");
        self.handle_push(&payload.kind()).await
    }

    pub async fn register_push_subscription(&self, subscription: serde_json::Value) -> Result<()> {
        let (_, user) = self.context().await?;
        self.api
            .update_user(
                &user.id,
                &UserPatch {
                    push_subscription: Some(subscription),
                    ..UserPatch::default()
                },
            )
            .await
            .context("failed to register push subscription")
    }
}

#[cfg(test)]
#[path = "tests/push_tests.rs"]
mod tests;
