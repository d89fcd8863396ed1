use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(EventId);
id_newtype!(UserId);
id_newtype!(PartnerId);
id_newtype!(MaterialId);
id_newtype!(MeetingId);
id_newtype!(InterestId);
id_newtype!(MessageId);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: EventId,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_program: Option<Program>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
}

/// What the stage currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Live,
    Break,
    Offline,
}

impl StageStatus {
    pub fn label(self) -> &'static str {
        match self {
            StageStatus::Live => "Live",
            StageStatus::Break => "Break",
            StageStatus::Offline => "Offline",
        }
    }
}

impl Event {
    pub fn stage_status(&self) -> StageStatus {
        match &self.current_program {
            None => StageStatus::Offline,
            Some(program) if program.is_break => StageStatus::Break,
            Some(_) => StageStatus::Live,
        }
    }

    /// The stream is only embedded while a program is running and a stream url is set.
    pub fn stage_stream(&self) -> Option<&str> {
        self.current_program.as_ref()?;
        self.stream_url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default)]
    pub time: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Box<User>>,
    #[serde(rename = "break", default)]
    pub is_break: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub app_dialog_seen: bool,
}

impl UserDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }

    /// "Title, Company" when a title is known, otherwise just the company.
    pub fn headline(&self) -> String {
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("{title}, {}", self.company),
            None => self.company.clone(),
        }
    }
}

/// A user record as the backend returns it. `I` is the interest representation:
/// plain ids for the signed-in user, expanded [`Interest`] records for profiles
/// of other attendees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord<I> {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<Box<Partner>>,
    #[serde(default)]
    pub partner_admin: bool,
    #[serde(default = "Vec::new")]
    pub interests: Vec<I>,
    #[serde(default)]
    pub available_times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_interests: Option<u32>,
    #[serde(flatten)]
    pub details: UserDetails,
}

pub type User = UserRecord<InterestId>;
pub type UserProfile = UserRecord<Interest>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(rename = "_id")]
    pub id: PartnerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub slogan: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "_id")]
    pub id: MaterialId,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub as_embed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    #[serde(rename = "_id")]
    pub id: InterestId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: MessageId,
    pub message: String,
    pub sender: User,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub unread: u32,
    pub user: UserProfile,
    #[serde(default)]
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("meeting status must be -1, 0 or 1, got {0}")]
pub struct InvalidMeetingStatus(pub i8);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum MeetingStatus {
    Declined,
    #[default]
    Pending,
    Accepted,
}

impl MeetingStatus {
    pub fn code(self) -> i8 {
        match self {
            MeetingStatus::Declined => -1,
            MeetingStatus::Pending => 0,
            MeetingStatus::Accepted => 1,
        }
    }

    pub fn is_pending(self) -> bool {
        self == MeetingStatus::Pending
    }

    pub fn label(self) -> &'static str {
        match self {
            MeetingStatus::Declined => "declined",
            MeetingStatus::Pending => "pending",
            MeetingStatus::Accepted => "accepted",
        }
    }
}

impl TryFrom<i8> for MeetingStatus {
    type Error = InvalidMeetingStatus;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(MeetingStatus::Declined),
            0 => Ok(MeetingStatus::Pending),
            1 => Ok(MeetingStatus::Accepted),
            other => Err(InvalidMeetingStatus(other)),
        }
    }
}

impl From<MeetingStatus> for i8 {
    fn from(value: MeetingStatus) -> Self {
        value.code()
    }
}

/// User-initiated meeting transitions. Cancelling an own proposal is a decline
/// written by the creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeetingAction {
    Accept,
    Decline,
    CancelProposal,
}

impl MeetingAction {
    pub fn target_status(self) -> MeetingStatus {
        match self {
            MeetingAction::Accept => MeetingStatus::Accepted,
            MeetingAction::Decline | MeetingAction::CancelProposal => MeetingStatus::Declined,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(rename = "_id")]
    pub id: MeetingId,
    pub creator: User,
    pub receiver: User,
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: MeetingStatus,
}

impl Meeting {
    pub fn is_created_by(&self, user_id: &UserId) -> bool {
        &self.creator.id == user_id
    }

    /// The other party of the meeting from `viewer`'s point of view.
    pub fn counterpart(&self, viewer: &UserId) -> &User {
        if self.is_created_by(viewer) {
            &self.receiver
        } else {
            &self.creator
        }
    }

    /// Pending proposals addressed to `viewer` that still need an answer.
    pub fn is_waiting_for(&self, viewer: &UserId) -> bool {
        self.status.is_pending() && !self.is_created_by(viewer)
    }

    /// Actions offered to `viewer`. The server remains the authority on what
    /// transitions are legal.
    pub fn actions_for(&self, viewer: &UserId) -> Vec<MeetingAction> {
        if !self.status.is_pending() {
            return Vec::new();
        }
        if self.is_created_by(viewer) {
            vec![MeetingAction::CancelProposal]
        } else {
            vec![MeetingAction::Accept, MeetingAction::Decline]
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
