use super::*;

#[test]
fn global_flags_parse_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "attendee",
        "meetings",
        "--event",
        "summit",
        "--api-base-url",
        "https://api.example.com",
    ])
    .expect("parse");

    assert_eq!(cli.event_key.as_deref(), Some("summit"));
    assert_eq!(cli.api_base_url.as_deref(), Some("https://api.example.com"));
    assert!(matches!(cli.command, Command::Meetings));
}

#[test]
fn onboarding_collects_repeated_flags() {
    let cli = Cli::try_parse_from([
        "attendee",
        "onboard",
        "--first-name",
        "Ada",
        "--interest",
        "i1",
        "--interest",
        "i2",
        "--time",
        "09:00-09:15",
    ])
    .expect("parse");

    let Command::Onboard {
        details,
        interests,
        times,
        all_times,
    } = cli.command
    else {
        panic!("expected onboard");
    };
    assert_eq!(details.first_name.as_deref(), Some("Ada"));
    assert_eq!(interests, vec!["i1", "i2"]);
    assert_eq!(times, vec!["09:00-09:15"]);
    assert!(!all_times);
}

#[test]
fn availability_rejects_all_with_clear() {
    assert!(Cli::try_parse_from(["attendee", "availability", "--all", "--clear"]).is_err());
}

#[test]
fn commands_declare_what_they_need() {
    assert_eq!(Command::Slots.requirement(), Requirement::Nothing);
    assert_eq!(Command::Whoami.requirement(), Requirement::User);
    assert_eq!(
        Command::Accept {
            meeting_id: "m1".into()
        }
        .requirement(),
        Requirement::CompletedProfile
    );
}

#[test]
fn profile_flags_overwrite_only_given_fields() {
    let mut details = UserDetails {
        first_name: "Ada".into(),
        company: "Engines Ltd".into(),
        title: Some("Analyst".into()),
        ..UserDetails::default()
    };
    let args = ProfileArgs {
        company: Some(" Analytical Co ".into()),
        title: Some(String::new()),
        hidden: Some(true),
        ..ProfileArgs::default()
    };

    args.apply(&mut details);

    assert_eq!(details.first_name, "Ada");
    assert_eq!(details.company, "Analytical Co");
    assert_eq!(details.title, None);
    assert!(details.hidden);
}

#[test]
fn slot_labels_are_checked() {
    assert!(check_slot("08:30-08:45").is_ok());
    assert!(check_slot("8:30").is_err());
}

#[test]
fn slots_outside_the_day_are_refused() {
    assert!(check_slot("02:00-02:15").is_err());
    assert!(check_slot("22:45-23:00").is_ok());
}

#[test]
fn push_takes_a_json_payload() {
    let cli = Cli::try_parse_from([
        "attendee",
        "push",
        r#"{"title":"New message","type":"CHAT"}"#,
    ])
    .expect("parse");

    let Command::Push { payload } = cli.command else {
        panic!("expected push");
    };
    let payload = PushPayload::from_json(&payload).expect("decode");
    assert_eq!(payload.kind(), client_core::push::PushKind::Chat);
}

#[tokio::test]
async fn logout_forgets_the_stored_token_without_a_backend() {
    use client_core::session::TOKEN_STORAGE_KEY;
    use storage::{KeyValueStore, MemoryStore};

    let store = Arc::new(MemoryStore::new());
    store
        .set_item(TOKEN_STORAGE_KEY, "stored-token")
        .await
        .expect("seed token");
    // Nothing listens on port 9; any request would fail.
    let client = SessionClient::new("http://127.0.0.1:9/", store.clone()).expect("client");
    client.set_token(Some("stored-token".into())).await;

    forget_session(&client).await;

    assert_eq!(client.token().await, None);
    assert_eq!(store.get_item(TOKEN_STORAGE_KEY).await.expect("read"), None);
}
