use super::*;
use crate::test_support::{
    conversation_json, meeting_json, ready_session, MockBackend, EVENT_ID, ME,
};
use axum::http::Method;
use serde_json::json;

#[test]
fn payload_type_selects_the_kind() {
    let chat = PushPayload::from_json(
        r#"{"title":"New message","body":"Ada: hi","type":"CHAT"}"#,
    )
    .expect("decode");
    assert_eq!(chat.title, "New message");
    assert_eq!(chat.body, "Ada: hi");
    assert_eq!(chat.kind(), PushKind::Chat);

    let meeting = PushPayload::from_json(r#"{"type":"MEETING"}"#).expect("decode");
    assert_eq!(meeting.kind(), PushKind::Meeting);
    assert_eq!(meeting.title, "");
}

#[test]
fn unknown_or_missing_type_is_other() {
    let unknown = PushPayload::from_json(r#"{"title":"x","type":"BROADCAST"}"#).expect("decode");
    assert_eq!(unknown.kind(), PushKind::Other("BROADCAST".into()));

    let untyped = PushPayload::from_json("{}").expect("decode");
    assert_eq!(untyped.kind(), PushKind::Other(String::new()));
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(PushPayload::from_json("CHAT").is_err());
    assert!(PushPayload::from_json(r#"{"type":5}"#).is_err());
}

#[tokio::test]
async fn payload_refreshes_the_counter_it_names() {
    let backend = MockBackend::new();
    backend
        .respond(
            Method::GET,
            &format!("/meetings/{EVENT_ID}/waiting"),
            json!([meeting_json("m1", "user-2", ME, 0)]),
        )
        .await;
    backend
        .respond(
            Method::GET,
            &format!("/messages/{EVENT_ID}"),
            json!([conversation_json("user-2", 3)]),
        )
        .await;
    let session = ready_session(&backend).await;

    let payload = PushPayload::from_json(r#"{"title":"Meeting request","type":"MEETING"}"#)
        .expect("decode");
    session
        .handle_push_payload(&payload)
        .await
        .expect("meeting push");

    assert_eq!(session.snapshot().await.waiting_meetings, 1);
    assert!(backend
        .requests_to(Method::GET, &format!("/messages/{EVENT_ID}"))
        .await
        .is_empty());
}
