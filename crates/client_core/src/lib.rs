//! Attendee-side client for the event platform: an authenticated session
//! against the backend, typed endpoint bindings, and the state and view
//! models behind each page.

pub mod api;
pub mod chat;
pub mod directory;
pub mod error;
pub mod exhibition;
pub mod lobby;
pub mod media;
pub mod meetings;
pub mod onboarding;
pub mod push;
pub mod session;
pub mod state;

pub use api::EventApi;
pub use error::RequestError;
pub use session::SessionClient;
pub use state::{ClientEvent, EventSession, EventState, Page, SessionPhase};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
