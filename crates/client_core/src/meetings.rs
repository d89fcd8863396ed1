use anyhow::{bail, Context, Result};
use shared::{
    domain::{EventId, Meeting, MeetingAction, UserId},
    protocol::NewMeeting,
};
use thiserror::Error;
use tracing::info;

use crate::state::EventSession;

/// The meetings page: proposals waiting for the viewer's answer, and
/// everything else.
#[derive(Debug, Clone, Default)]
pub struct MeetingBoard {
    pub waiting: Vec<Meeting>,
    pub meetings: Vec<Meeting>,
}

impl MeetingBoard {
    pub fn partition(all: Vec<Meeting>, viewer: &UserId) -> Self {
        let (waiting, meetings) = all
            .into_iter()
            .partition(|meeting| meeting.is_waiting_for(viewer));
        Self { waiting, meetings }
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty() && self.meetings.is_empty()
    }

    pub fn find(&self, meeting_id: &str) -> Option<&Meeting> {
        self.waiting
            .iter()
            .chain(self.meetings.iter())
            .find(|meeting| meeting.id.as_str() == meeting_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposalError {
    #[error("a meeting time is required")]
    MissingTime,
    #[error("a meeting location is required")]
    MissingLocation,
    #[error("{0} is not one of the other attendee's available times")]
    UnavailableTime(String),
}

#[derive(Debug, Clone, Default)]
pub struct MeetingProposal {
    pub receiver: UserId,
    pub time: Option<String>,
    pub location: String,
    pub message: Option<String>,
}

impl MeetingProposal {
    /// Time and location are mandatory; the time must be one the receiver
    /// marked as available.
    pub fn validate(&self, available_times: &[String]) -> Result<(), ProposalError> {
        let time = self
            .time
            .as_deref()
            .map(str::trim)
            .filter(|time| !time.is_empty())
            .ok_or(ProposalError::MissingTime)?;
        if self.location.trim().is_empty() {
            return Err(ProposalError::MissingLocation);
        }
        if !available_times.iter().any(|slot| slot == time) {
            return Err(ProposalError::UnavailableTime(time.to_string()));
        }
        Ok(())
    }

    pub fn into_request(self, event: EventId, creator: UserId) -> NewMeeting {
        NewMeeting {
            event,
            creator,
            receiver: self.receiver,
            time: self.time.unwrap_or_default().trim().to_string(),
            location: self.location.trim().to_string(),
            message: self.message.filter(|m| !m.trim().is_empty()),
        }
    }
}

impl EventSession {
    /// Loads the event's meetings and updates the waiting counter.
    pub async fn meeting_board(&self) -> Result<MeetingBoard> {
        let (event, user) = self.context().await?;
        let meetings = self
            .api
            .meetings(&event.id)
            .await
            .context("failed to load meetings")?;
        let board = MeetingBoard::partition(meetings, &user.id);
        self.set_waiting_meetings(board.waiting.len()).await;
        Ok(board)
    }

    /// Writes the action's target status and reloads the board. Whether the
    /// transition is allowed is left to the backend.
    pub async fn respond_to_meeting(
        &self,
        meeting: &Meeting,
        action: MeetingAction,
    ) -> Result<MeetingBoard> {
        let status = action.target_status();
        self.api
            .set_meeting_status(&meeting.id, status)
            .await
            .with_context(|| format!("failed to mark meeting {} {}", meeting.id, status.label()))?;
        info!(meeting_id = %meeting.id, status = status.label(), "meeting updated");
        self.meeting_board().await
    }

    pub async fn available_times_of(&self, other: &UserId) -> Result<Vec<String>> {
        let event = self.event().await?;
        self.api
            .available_times(&event.id, other)
            .await
            .with_context(|| format!("failed to load available times of {other}"))
    }

    pub async fn propose_meeting(&self, proposal: MeetingProposal) -> Result<()> {
        let (event, user) = self.context().await?;
        if proposal.receiver == user.id {
            bail!("cannot propose a meeting to yourself");
        }
        let available = self.available_times_of(&proposal.receiver).await?;
        proposal.validate(&available)?;

        let request = proposal.into_request(event.id, user.id);
        self.api
            .propose_meeting(&request)
            .await
            .context("failed to send meeting proposal")?;
        info!(receiver = %request.receiver, time = %request.time, "meeting proposal sent");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/meetings_tests.rs"]
mod tests;
