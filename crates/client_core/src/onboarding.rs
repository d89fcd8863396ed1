use anyhow::{Context, Result};
use shared::{
    domain::{Interest, User, UserDetails},
    protocol::UserPatch,
    schedule::{day_slot_labels, toggle},
};

use crate::{media::MediaSource, state::EventSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStage {
    Details,
    Interests,
    Availability,
}

impl OnboardingStage {
    pub const ALL: [OnboardingStage; 3] = [
        OnboardingStage::Details,
        OnboardingStage::Interests,
        OnboardingStage::Availability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OnboardingStage::Details => "Details",
            OnboardingStage::Interests => "Interests",
            OnboardingStage::Availability => "Availability",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            OnboardingStage::Details => Some(OnboardingStage::Interests),
            OnboardingStage::Interests => Some(OnboardingStage::Availability),
            OnboardingStage::Availability => None,
        }
    }
}

/// Everything a first-time user fills in before entering the event.
#[derive(Debug, Clone, Default)]
pub struct OnboardingDraft {
    pub details: UserDetails,
    pub picture: Option<MediaSource>,
    pub interests: Vec<String>,
    pub available_times: Vec<String>,
}

impl OnboardingDraft {
    /// Details are prefilled from what the organiser already knows about the
    /// user; interests and availability start empty.
    pub fn for_user(user: &User) -> Self {
        Self {
            details: user.details.clone(),
            ..Self::default()
        }
    }

    pub fn toggle_interest(&mut self, interest_id: &str) {
        toggle(&mut self.interests, interest_id);
    }

    pub fn toggle_time(&mut self, slot: &str) {
        toggle(&mut self.available_times, slot);
    }

    pub fn select_all_times(&mut self) {
        self.available_times = day_slot_labels();
    }

    pub fn clear_times(&mut self) {
        self.available_times.clear();
    }

    pub fn to_patch(&self) -> UserPatch {
        UserPatch {
            interests: Some(self.interests.clone()),
            available_times: Some(self.available_times.clone()),
            ..UserPatch::from_details(&self.details)
        }
    }
}

impl EventSession {
    pub async fn event_interests(&self) -> Result<Vec<Interest>> {
        let event = self.event().await?;
        self.api
            .interests(&event.id)
            .await
            .context("failed to load interests")
    }

    /// Saves the whole draft at once and marks the profile as completed.
    pub async fn complete_onboarding(&self, draft: OnboardingDraft) -> Result<User> {
        let patch = draft.to_patch();
        let user = self.save_details(patch, draft.picture).await?;
        self.refresh_counts().await;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_run_details_interests_availability() {
        let mut stage = OnboardingStage::Details;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, OnboardingStage::ALL.to_vec());
    }

    #[test]
    fn patch_carries_details_interests_and_times() {
        let mut draft = OnboardingDraft {
            details: UserDetails {
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                email: "grace@example.com".into(),
                ..UserDetails::default()
            },
            ..OnboardingDraft::default()
        };
        draft.toggle_interest("i1");
        draft.toggle_interest("i2");
        draft.toggle_interest("i1");
        draft.select_all_times();
        draft.toggle_time("08:30-08:45");

        let patch = draft.to_patch();
        assert_eq!(patch.first_name.as_deref(), Some("Grace"));
        assert_eq!(patch.interests, Some(vec!["i2".to_string()]));
        let times = patch.available_times.expect("times");
        assert_eq!(times.len(), 57);
        assert!(!times.contains(&"08:30-08:45".to_string()));
    }
}
