use super::*;
use crate::test_support::{ready_session, user_json, MockBackend, EVENT_ID};
use axum::http::Method;
use serde_json::json;

#[tokio::test]
async fn directory_loads_searches_and_pages() {
    let backend = MockBackend::new();
    let people_path = format!("/people/{EVENT_ID}");
    backend
        .respond(
            Method::GET,
            &people_path,
            json!([user_json("user-2", true), user_json("user-3", true)]),
        )
        .await;
    let session = ready_session(&backend).await;

    let mut directory = session.people_directory().await.expect("directory");
    assert_eq!(directory.users().len(), 2);
    assert!(directory.can_load_more());

    let added = directory.load_more(session.api()).await.expect("more");
    assert_eq!(added, 2);
    assert_eq!(directory.users().len(), 4);

    directory
        .search(session.api(), " lovelace ")
        .await
        .expect("search");
    assert_eq!(directory.search_term(), "lovelace");
    assert!(!directory.can_load_more());
    assert_eq!(directory.load_more(session.api()).await.expect("more"), 0);

    let queries: Vec<Option<String>> = backend
        .requests_to(Method::GET, &people_path)
        .await
        .into_iter()
        .map(|r| r.query)
        .collect();
    assert_eq!(
        queries,
        vec![
            Some("search=".to_string()),
            Some("skip=2".to_string()),
            Some("search=lovelace".to_string()),
        ]
    );
}

#[tokio::test]
async fn empty_directory_offers_no_paging() {
    let backend = MockBackend::new();
    backend
        .respond(Method::GET, &format!("/people/{EVENT_ID}"), json!([]))
        .await;
    let session = ready_session(&backend).await;

    let mut directory = session.people_directory().await.expect("directory");

    assert!(!directory.can_load_more());
    assert_eq!(directory.load_more(session.api()).await.expect("more"), 0);
}

#[tokio::test]
async fn profiles_expand_interests() {
    let backend = MockBackend::new();
    let mut profile = user_json("user-2", true);
    profile["interests"] = json!([{ "_id": "i1", "name": "Rust" }]);
    profile["similarInterests"] = json!(1);
    backend
        .respond(Method::GET, &format!("/users/{EVENT_ID}/user-2"), profile)
        .await;
    let session = ready_session(&backend).await;

    let profile = session
        .user_profile(&UserId::from("user-2"))
        .await
        .expect("profile");

    assert_eq!(profile.interests[0].name, "Rust");
    assert_eq!(profile.similar_interests, Some(1));
    assert_eq!(profile.details.full_name(), "Ada Lovelace");
}
