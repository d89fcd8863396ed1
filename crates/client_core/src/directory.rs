use anyhow::{Context, Result};
use shared::{
    domain::{EventId, User, UserId, UserProfile},
    protocol::PeopleQuery,
};

use crate::{api::EventApi, state::EventSession};

/// The people page: a searchable, incrementally loaded list of attendees.
#[derive(Debug, Clone)]
pub struct PeopleDirectory {
    event_id: EventId,
    search: String,
    users: Vec<User>,
}

impl PeopleDirectory {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            search: String::new(),
            users: Vec::new(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Paging is only offered for the unfiltered list once it has content.
    pub fn can_load_more(&self) -> bool {
        !self.users.is_empty() && self.search.is_empty()
    }

    /// Replaces the list with the results for the current search term.
    pub async fn refresh(&mut self, api: &EventApi) -> Result<&[User]> {
        let query = PeopleQuery {
            search: Some(self.search.clone()),
            skip: None,
        };
        self.users = api
            .people(&self.event_id, &query)
            .await
            .context("failed to load people")?;
        Ok(&self.users)
    }

    pub async fn search(&mut self, api: &EventApi, term: &str) -> Result<&[User]> {
        self.search = term.trim().to_string();
        self.refresh(api).await
    }

    /// Appends the next page, returning how many people were added.
    pub async fn load_more(&mut self, api: &EventApi) -> Result<usize> {
        if !self.can_load_more() {
            return Ok(0);
        }
        let query = PeopleQuery {
            search: None,
            skip: Some(self.users.len()),
        };
        let page = api
            .people(&self.event_id, &query)
            .await
            .context("failed to load more people")?;
        let added = page.len();
        self.users.extend(page);
        Ok(added)
    }
}

impl EventSession {
    pub async fn people_directory(&self) -> Result<PeopleDirectory> {
        let event = self.event().await?;
        let mut directory = PeopleDirectory::new(event.id);
        directory.refresh(&self.api).await?;
        Ok(directory)
    }

    pub async fn user_profile(&self, user_id: &UserId) -> Result<UserProfile> {
        let event = self.event().await?;
        self.api
            .user_profile(&event.id, user_id)
            .await
            .with_context(|| format!("failed to load user {user_id}"))
    }
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
