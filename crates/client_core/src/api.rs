use std::sync::Arc;

use serde::de::IgnoredAny;
use shared::{
    domain::{
        ChatMessage, Conversation, Event, EventId, Interest, MaterialId, Meeting, MeetingId,
        MeetingStatus, Partner, PartnerId, User, UserId, UserProfile,
    },
    protocol::{
        BoothVisit, LoginRequest, LoginResponse, MaterialDraft, MeetingStatusUpdate,
        NewChatMessage, NewMeeting, PartnerUpdate, PeopleQuery, UserPatch,
    },
};

use crate::{error::RequestError, session::SessionClient};

type ApiResult<T> = Result<T, RequestError>;

/// Typed bindings for the event backend's REST endpoints.
#[derive(Clone)]
pub struct EventApi {
    session: Arc<SessionClient>,
}

impl EventApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionClient> {
        &self.session
    }

    pub async fn login(&self, code: &str) -> ApiResult<LoginResponse> {
        self.session
            .post(
                "auth/login",
                &LoginRequest {
                    code: code.to_string(),
                },
            )
            .await
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        self.session.get("user").await
    }

    pub async fn update_user(&self, user_id: &UserId, patch: &UserPatch) -> ApiResult<()> {
        let _: IgnoredAny = self
            .session
            .patch(&format!("users/{user_id}"), patch)
            .await?;
        Ok(())
    }

    pub async fn user_profile(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> ApiResult<UserProfile> {
        self.session
            .get(&format!("users/{event_id}/{user_id}"))
            .await
    }

    pub async fn event(&self, key: &str) -> ApiResult<Event> {
        self.session.get(&format!("events/{key}")).await
    }

    pub async fn partners(&self, event_id: &EventId) -> ApiResult<Vec<Partner>> {
        self.session.get(&format!("partners/{event_id}")).await
    }

    pub async fn partner(&self, event_id: &EventId, partner_id: &PartnerId) -> ApiResult<Partner> {
        self.session
            .get(&format!("partners/{event_id}/{partner_id}"))
            .await
    }

    pub async fn update_partner(
        &self,
        partner_id: &PartnerId,
        update: &PartnerUpdate,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .session
            .patch(&format!("partners/{partner_id}"), update)
            .await?;
        Ok(())
    }

    pub async fn create_material(&self, draft: &MaterialDraft) -> ApiResult<()> {
        let _: IgnoredAny = self.session.post("materials", draft).await?;
        Ok(())
    }

    pub async fn update_material(
        &self,
        material_id: &MaterialId,
        draft: &MaterialDraft,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .session
            .patch(&format!("materials/{material_id}"), draft)
            .await?;
        Ok(())
    }

    pub async fn delete_material(&self, material_id: &MaterialId) -> ApiResult<()> {
        let _: IgnoredAny = self
            .session
            .delete(&format!("materials/{material_id}"))
            .await?;
        Ok(())
    }

    pub async fn meetings(&self, event_id: &EventId) -> ApiResult<Vec<Meeting>> {
        self.session.get(&format!("meetings/{event_id}")).await
    }

    pub async fn waiting_meetings(&self, event_id: &EventId) -> ApiResult<Vec<Meeting>> {
        let meetings: Option<Vec<Meeting>> = self
            .session
            .get(&format!("meetings/{event_id}/waiting"))
            .await?;
        Ok(meetings.unwrap_or_default())
    }

    pub async fn propose_meeting(&self, meeting: &NewMeeting) -> ApiResult<()> {
        let _: IgnoredAny = self.session.post("meetings", meeting).await?;
        Ok(())
    }

    /// Writes a new status without checking the transition; the backend
    /// decides whether the caller may make it.
    pub async fn set_meeting_status(
        &self,
        meeting_id: &MeetingId,
        status: MeetingStatus,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .session
            .patch(
                &format!("meetings/{meeting_id}"),
                &MeetingStatusUpdate { status },
            )
            .await?;
        Ok(())
    }

    pub async fn conversations(&self, event_id: &EventId) -> ApiResult<Vec<Conversation>> {
        self.session.get(&format!("messages/{event_id}")).await
    }

    pub async fn messages(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> ApiResult<Vec<ChatMessage>> {
        self.session
            .get(&format!("messages/{event_id}/{user_id}"))
            .await
    }

    pub async fn send_message(&self, message: &NewChatMessage) -> ApiResult<()> {
        let _: IgnoredAny = self.session.post("messages", message).await?;
        Ok(())
    }

    pub async fn interests(&self, event_id: &EventId) -> ApiResult<Vec<Interest>> {
        self.session.get(&format!("interests/{event_id}")).await
    }

    pub async fn people(&self, event_id: &EventId, query: &PeopleQuery) -> ApiResult<Vec<User>> {
        self.session
            .get_query(&format!("people/{event_id}"), query)
            .await
    }

    pub async fn relevant_people(&self, event_id: &EventId) -> ApiResult<Vec<User>> {
        self.session
            .get(&format!("people/{event_id}/relevant"))
            .await
    }

    pub async fn available_times(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> ApiResult<Vec<String>> {
        let times: Option<Vec<String>> = self
            .session
            .get(&format!("people/{event_id}/{user_id}/availableTimes"))
            .await?;
        Ok(times.unwrap_or_default())
    }

    pub async fn log_booth_visit(
        &self,
        event_id: &EventId,
        partner_id: &PartnerId,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .session
            .post(
                "logs/booth-visited",
                &BoothVisit {
                    event: event_id.clone(),
                    partner: partner_id.clone(),
                },
            )
            .await?;
        Ok(())
    }
}
