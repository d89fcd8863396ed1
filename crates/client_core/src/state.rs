use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use shared::{
    domain::{Conversation, Event, User},
    protocol::UserPatch,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    api::EventApi,
    chat::total_unread,
    media::{resolve_media, MediaKind, MediaSource, MediaUploader, MissingMediaUploader},
};

/// Top-level pages of the attendee client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Lobby,
    Stage,
    People,
    Meetings,
    Exhibition,
}

impl Page {
    /// Unknown or missing values fall back to the lobby.
    pub fn from_query(page: Option<&str>) -> Self {
        match page.map(str::trim) {
            Some("stage") => Page::Stage,
            Some("people") => Page::People,
            Some("meetings") => Page::Meetings,
            Some("exhibition") => Page::Exhibition,
            _ => Page::Lobby,
        }
    }

    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Page::Lobby => None,
            Page::Stage => Some("stage"),
            Page::People => Some("people"),
            Page::Meetings => Some("meetings"),
            Page::Exhibition => Some("exhibition"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Lobby => "Lobby",
            Page::Stage => "Stage",
            Page::People => "People",
            Page::Meetings => "Meetings",
            Page::Exhibition => "Exhibition",
        }
    }
}

/// Which screen the client can show given what it has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Login,
    Onboarding,
    Ready,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    EventLoaded(Event),
    UserChanged(Option<User>),
    WaitingMeetingsChanged(usize),
    ConversationsUpdated { count: usize, unread: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct EventState {
    pub event: Option<Event>,
    pub user: Option<User>,
    pub waiting_meetings: usize,
    pub conversations: Vec<Conversation>,
    pub loading_conversations: bool,
    pub unread_conversations: u32,
}

impl EventState {
    pub fn phase(&self) -> SessionPhase {
        match (&self.event, &self.user) {
            (None, _) => SessionPhase::Loading,
            (Some(_), None) => SessionPhase::Login,
            (Some(_), Some(user)) if !user.details.logged_in => SessionPhase::Onboarding,
            (Some(_), Some(_)) => SessionPhase::Ready,
        }
    }

    fn signed_in(&self) -> Option<(Event, User)> {
        let event = self.event.clone()?;
        let user = self.user.clone().filter(|user| user.details.logged_in)?;
        Some((event, user))
    }
}

/// The current event, the signed-in user and the counters derived from them.
/// Views read snapshots; changes are also broadcast as [`ClientEvent`]s.
pub struct EventSession {
    pub(crate) api: EventApi,
    pub(crate) media: Arc<dyn MediaUploader>,
    inner: Mutex<EventState>,
    events: broadcast::Sender<ClientEvent>,
}

impl EventSession {
    pub fn new(api: EventApi) -> Self {
        Self::with_media_uploader(api, Arc::new(MissingMediaUploader))
    }

    pub fn with_media_uploader(api: EventApi, media: Arc<dyn MediaUploader>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            media,
            inner: Mutex::new(EventState::default()),
            events,
        }
    }

    pub fn api(&self) -> &EventApi {
        &self.api
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> EventState {
        self.inner.lock().await.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase()
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) async fn event(&self) -> Result<Event> {
        self.inner
            .lock()
            .await
            .event
            .clone()
            .ok_or_else(|| anyhow!("no event loaded"))
    }

    /// Event and user for views that need a completed profile.
    pub(crate) async fn context(&self) -> Result<(Event, User)> {
        let guard = self.inner.lock().await;
        let event = guard
            .event
            .clone()
            .ok_or_else(|| anyhow!("no event loaded"))?;
        let user = guard
            .user
            .clone()
            .ok_or_else(|| anyhow!("not logged in"))?;
        Ok((event, user))
    }

    pub async fn load_event(&self, key: &str) -> Result<Event> {
        let key = key.trim();
        if key.is_empty() {
            self.inner.lock().await.event = None;
            return Err(anyhow!("event key must not be empty"));
        }
        let event = self
            .api
            .event(key)
            .await
            .with_context(|| format!("failed to load event '{key}'"))?;
        info!(event_id = %event.id, name = %event.name, "event loaded");
        self.inner.lock().await.event = Some(event.clone());
        self.emit(ClientEvent::EventLoaded(event.clone()));
        Ok(event)
    }

    /// Re-fetches the loaded event, e.g. to pick up a program change.
    pub async fn reload_event(&self) -> Result<Event> {
        let event = self.event().await?;
        self.load_event(&event.key).await
    }

    /// Works out who is using the client: a login code wins, then an already
    /// held user is refreshed, then a persisted token is tried. A stored token
    /// that the backend rejects or that belongs to a different event is
    /// discarded.
    pub async fn restore_user(&self, code: Option<&str>) -> Result<Option<User>> {
        let event = self.event().await?;

        if let Some(code) = code.filter(|code| !code.trim().is_empty()) {
            return self.login(code).await.map(Some);
        }

        if self.inner.lock().await.user.is_some() {
            return self.refresh_user().await.map(Some);
        }

        let Some(saved_token) = self.api.session().load_token_from_store().await else {
            debug!("no stored session token");
            return Ok(None);
        };
        self.api.session().set_token(Some(saved_token)).await;

        let user = match self.api.current_user().await {
            Err(err) if err.is_unauthorized() => {
                warn!(error = %err, "stored session token was rejected");
                self.logout().await;
                return Ok(None);
            }
            other => other.context("failed to load user for stored token")?,
        };
        if user.event.as_ref() != Some(&event.id) {
            warn!(
                user_id = %user.id,
                event_id = %event.id,
                "stored session belongs to another event"
            );
            self.logout().await;
            return Ok(None);
        }

        self.set_user(Some(user.clone())).await;
        Ok(Some(user))
    }

    pub async fn login(&self, code: &str) -> Result<User> {
        let code = code.trim().to_uppercase();
        let response = self.api.login(&code).await.context("login failed")?;
        self.api
            .session()
            .set_token(Some(response.access_token))
            .await;
        let user = response.user;
        info!(user_id = %user.id, "logged in");
        self.set_user(Some(user.clone())).await;
        Ok(user)
    }

    pub async fn logout(&self) {
        self.api.session().set_token(None).await;
        {
            let mut guard = self.inner.lock().await;
            guard.waiting_meetings = 0;
            guard.conversations.clear();
            guard.unread_conversations = 0;
        }
        self.set_user(None).await;
        info!("logged out");
    }

    async fn set_user(&self, user: Option<User>) {
        self.inner.lock().await.user = user.clone();
        self.emit(ClientEvent::UserChanged(user));
    }

    pub async fn refresh_user(&self) -> Result<User> {
        let user = self
            .api
            .current_user()
            .await
            .context("failed to refresh user")?;
        self.set_user(Some(user.clone())).await;
        Ok(user)
    }

    /// Counts proposals waiting for the user's answer. Skipped until the
    /// profile has been completed.
    pub async fn refresh_waiting_meetings(&self) -> Result<usize> {
        let Some((event, _)) = self.inner.lock().await.signed_in() else {
            return Ok(0);
        };
        let waiting = self
            .api
            .waiting_meetings(&event.id)
            .await
            .context("failed to load waiting meetings")?;
        self.set_waiting_meetings(waiting.len()).await;
        Ok(waiting.len())
    }

    pub async fn set_waiting_meetings(&self, count: usize) {
        self.inner.lock().await.waiting_meetings = count;
        self.emit(ClientEvent::WaitingMeetingsChanged(count));
    }

    pub async fn refresh_conversations(&self) -> Result<Vec<Conversation>> {
        let Some((event, _)) = self.inner.lock().await.signed_in() else {
            return Ok(Vec::new());
        };
        self.inner.lock().await.loading_conversations = true;
        let result = self.api.conversations(&event.id).await;

        let mut guard = self.inner.lock().await;
        guard.loading_conversations = false;
        let conversations = result.context("failed to load conversations")?;
        let unread = total_unread(&conversations);
        guard.conversations = conversations.clone();
        guard.unread_conversations = unread;
        drop(guard);

        self.emit(ClientEvent::ConversationsUpdated {
            count: conversations.len(),
            unread,
        });
        Ok(conversations)
    }

    /// Refreshes the header counters after the user changed. The two
    /// counters are independent, so one failing leaves the other updated.
    pub async fn refresh_counts(&self) {
        let (waiting, conversations) =
            futures::join!(self.refresh_waiting_meetings(), self.refresh_conversations());
        if let Err(err) = waiting {
            warn!("waiting meetings counter not refreshed: {err:#}");
        }
        if let Err(err) = conversations {
            warn!("unread conversations counter not refreshed: {err:#}");
        }
    }

    async fn patch_current_user(&self, patch: &UserPatch) -> Result<User> {
        let (_, user) = self.context().await?;
        self.api
            .update_user(&user.id, patch)
            .await
            .with_context(|| format!("failed to update user {}", user.id))?;
        self.refresh_user().await
    }

    /// Saves profile details and marks the profile as completed. A local
    /// picture is uploaded first.
    pub async fn save_details(
        &self,
        mut patch: UserPatch,
        picture: Option<MediaSource>,
    ) -> Result<User> {
        if let Some(picture) = picture {
            let url =
                resolve_media(self.media.as_ref(), MediaKind::ProfilePicture, &picture).await?;
            patch.picture = Some(url);
        }
        patch.logged_in = Some(true);
        self.patch_current_user(&patch).await
    }

    pub async fn save_interests(&self, interests: Vec<String>) -> Result<User> {
        self.patch_current_user(&UserPatch {
            interests: Some(interests),
            ..UserPatch::default()
        })
        .await
    }

    pub async fn save_availability(&self, available_times: Vec<String>) -> Result<User> {
        self.patch_current_user(&UserPatch {
            available_times: Some(available_times),
            ..UserPatch::default()
        })
        .await
    }

    pub async fn mark_app_dialog_seen(&self) -> Result<User> {
        self.save_details(
            UserPatch {
                app_dialog_seen: Some(true),
                ..UserPatch::default()
            },
            None,
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
