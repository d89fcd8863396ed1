use serde::{Deserialize, Serialize};

/// Error payload returned by the backend for rejected requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: ErrorMessage,
}

/// Validation failures arrive as a list of messages, everything else as one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl Default for ErrorMessage {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl ErrorMessage {
    pub fn text(&self) -> String {
        match self {
            Self::Single(message) => message.trim().to_string(),
            Self::Many(messages) => messages
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl ErrorBody {
    /// Extracts a non-empty `message` from a raw error body, if it has one.
    pub fn message_from_bytes(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|body| body.message.text())
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_single_message() {
        let body = br#"{"statusCode":401,"message":"jwt expired"}"#;
        assert_eq!(
            ErrorBody::message_from_bytes(body).as_deref(),
            Some("jwt expired")
        );
    }

    #[test]
    fn joins_validation_messages() {
        let body = br#"{"message":["email must be an email"," ","phone is too long"]}"#;
        assert_eq!(
            ErrorBody::message_from_bytes(body).as_deref(),
            Some("email must be an email, phone is too long")
        );
    }

    #[test]
    fn blank_or_missing_messages_yield_nothing() {
        assert_eq!(ErrorBody::message_from_bytes(br#"{"message":"  "}"#), None);
        assert_eq!(ErrorBody::message_from_bytes(br#"{"message":[]}"#), None);
        assert_eq!(ErrorBody::message_from_bytes(br#"{"error":"x"}"#), None);
        assert_eq!(ErrorBody::message_from_bytes(b"<html>bad gateway</html>"), None);
        assert_eq!(ErrorBody::message_from_bytes(br#"{"message":42}"#), None);
    }
}
