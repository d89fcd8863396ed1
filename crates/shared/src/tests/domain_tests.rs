use super::*;
use serde_json::json;

fn user(id: &str) -> User {
    User {
        id: UserId::from(id),
        ..User::default()
    }
}

fn meeting(creator: &str, receiver: &str, status: MeetingStatus) -> Meeting {
    Meeting {
        id: MeetingId::from("m1"),
        creator: user(creator),
        receiver: user(receiver),
        time: "09:00-09:15".into(),
        location: "Booth 4".into(),
        message: None,
        status,
    }
}

#[test]
fn meeting_status_decodes_only_known_codes() {
    for (code, status) in [
        (-1, MeetingStatus::Declined),
        (0, MeetingStatus::Pending),
        (1, MeetingStatus::Accepted),
    ] {
        let decoded: MeetingStatus = serde_json::from_value(json!(code)).expect("decode");
        assert_eq!(decoded, status);
        assert_eq!(serde_json::to_value(status).expect("encode"), json!(code));
    }
    assert!(serde_json::from_value::<MeetingStatus>(json!(2)).is_err());
}

#[test]
fn every_action_lands_in_a_known_status() {
    for action in [
        MeetingAction::Accept,
        MeetingAction::Decline,
        MeetingAction::CancelProposal,
    ] {
        let code = action.target_status().code();
        assert!((-1..=1).contains(&code));
    }
}

#[test]
fn receiver_may_answer_pending_proposal() {
    let meeting = meeting("alice", "bob", MeetingStatus::Pending);
    let bob = UserId::from("bob");
    assert!(meeting.is_waiting_for(&bob));
    assert_eq!(
        meeting.actions_for(&bob),
        vec![MeetingAction::Accept, MeetingAction::Decline]
    );
    assert_eq!(meeting.counterpart(&bob).id, UserId::from("alice"));
}

#[test]
fn creator_may_only_cancel_own_proposal() {
    let meeting = meeting("alice", "bob", MeetingStatus::Pending);
    let alice = UserId::from("alice");
    assert!(!meeting.is_waiting_for(&alice));
    assert_eq!(meeting.actions_for(&alice), vec![MeetingAction::CancelProposal]);
    assert_eq!(meeting.counterpart(&alice).id, UserId::from("bob"));
}

#[test]
fn decided_meetings_offer_no_actions() {
    for status in [MeetingStatus::Accepted, MeetingStatus::Declined] {
        let meeting = meeting("alice", "bob", status);
        assert!(meeting.actions_for(&UserId::from("bob")).is_empty());
        assert!(meeting.actions_for(&UserId::from("alice")).is_empty());
    }
}

#[test]
fn user_decodes_with_flattened_details_and_missing_optionals() {
    let raw = json!({
        "_id": "u1",
        "code": "ABC123",
        "event": "e1",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "company": "Engines Ltd",
        "email": "ada@example.com",
        "interests": ["i1", "i2"],
        "availableTimes": ["09:00-09:15"],
        "loggedIn": true
    });
    let user: User = serde_json::from_value(raw).expect("decode user");
    assert_eq!(user.details.full_name(), "Ada Lovelace");
    assert_eq!(user.details.initials(), "AL");
    assert_eq!(user.details.headline(), "Engines Ltd");
    assert!(user.details.logged_in);
    assert!(user.details.picture.is_none());
    assert_eq!(user.interests, vec![InterestId::from("i1"), InterestId::from("i2")]);
}

#[test]
fn headline_prefers_title_when_known() {
    let details = UserDetails {
        title: Some("CTO".into()),
        company: "Acme".into(),
        ..UserDetails::default()
    };
    assert_eq!(details.headline(), "CTO, Acme");
}

#[test]
fn stage_shows_stream_only_while_program_runs() {
    let mut event = Event {
        id: EventId::from("e1"),
        key: "summit".into(),
        name: "Summit".into(),
        stream_url: Some("https://stream.example/live".into()),
        ..Event::default()
    };
    assert_eq!(event.stage_status(), StageStatus::Offline);
    assert_eq!(event.stage_stream(), None);

    event.current_program = Some(Program {
        name: "Keynote".into(),
        ..Program::default()
    });
    assert_eq!(event.stage_status(), StageStatus::Live);
    assert_eq!(event.stage_stream(), Some("https://stream.example/live"));

    if let Some(program) = event.current_program.as_mut() {
        program.is_break = true;
    }
    assert_eq!(event.stage_status(), StageStatus::Break);
}
