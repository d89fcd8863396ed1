use anyhow::{Context, Result};
use shared::domain::{Partner, Program, StageStatus, User};

use crate::state::EventSession;

#[derive(Debug, Clone)]
pub struct LobbyView {
    pub event_name: String,
    pub greeting: String,
    pub stage_status: StageStatus,
    pub program: Option<Program>,
    pub relevant_people: Vec<User>,
    pub partners: Vec<Partner>,
}

#[derive(Debug, Clone)]
pub struct StageView {
    pub status: StageStatus,
    pub stream_url: Option<String>,
    pub program: Option<Program>,
}

impl EventSession {
    /// Partners and relevant people are fetched concurrently.
    pub async fn lobby(&self) -> Result<LobbyView> {
        let (event, user) = self.context().await?;
        let (partners, relevant_people) = futures::try_join!(
            self.api.partners(&event.id),
            self.api.relevant_people(&event.id),
        )
        .context("failed to load lobby")?;

        Ok(LobbyView {
            event_name: event.name.clone(),
            greeting: format!("Hi, {}", user.details.first_name),
            stage_status: event.stage_status(),
            program: event.current_program.clone(),
            relevant_people,
            partners,
        })
    }

    /// Reloads the event so the stage reflects the current program.
    pub async fn stage(&self) -> Result<StageView> {
        let event = self.reload_event().await?;
        Ok(StageView {
            status: event.stage_status(),
            stream_url: event.stage_stream().map(str::to_string),
            program: event.current_program.clone(),
        })
    }
}
