use client_core::{
    exhibition::{admin_preview, material_target, PartnerSections},
    lobby::{LobbyView, StageView},
    meetings::MeetingBoard,
    state::EventState,
};
use shared::domain::{
    ChatMessage, Conversation, Interest, Meeting, Partner, Program, StageStatus, UserDetails,
    UserId, UserProfile, UserRecord,
};

pub fn person_line<I>(user: &UserRecord<I>) -> String {
    let mut line = format!("{}  {}", user.id, user.details.full_name());
    let headline = user.details.headline();
    if !headline.is_empty() {
        line.push_str(&format!(", {headline}"));
    }
    if let Some(shared) = user.similar_interests.filter(|n| *n > 0) {
        line.push_str(&format!(" ({shared} shared interests)"));
    }
    line
}

pub fn header(state: &EventState) -> String {
    let event = state
        .event
        .as_ref()
        .map(|e| e.name.as_str())
        .unwrap_or("(no event)");
    match &state.user {
        Some(user) => format!(
            "{event} | {} | {} waiting meetings | {} unread messages",
            user.details.full_name(),
            state.waiting_meetings,
            state.unread_conversations
        ),
        None => format!("{event} | not logged in"),
    }
}

pub fn details(details: &UserDetails) -> String {
    let mut lines = vec![
        format!("Name:        {}", details.full_name()),
        format!("Company:     {}", details.company),
        format!("Email:       {}", details.email),
    ];
    let optional = [
        ("Title", &details.title),
        ("Description", &details.description),
        ("Phone", &details.phone),
        ("LinkedIn", &details.linkedin),
        ("Picture", &details.picture),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("{:<13}{value}", format!("{label}:")));
        }
    }
    if details.hidden {
        lines.push("Hidden from the people directory".into());
    }
    lines.join("\n")
}

fn program_card(program: &Program) -> String {
    let mut card = format!("{}  {}", program.time, program.name);
    if let Some(speaker) = &program.speaker {
        card.push_str(&format!(" with {}", speaker.details.full_name()));
    }
    if !program.description.is_empty() {
        card.push_str(&format!("\n  {}", program.description));
    }
    card
}

fn stage_line(status: StageStatus, program: Option<&Program>) -> String {
    match (status, program) {
        (StageStatus::Live, Some(program)) => format!("Live now: {}", program_card(program)),
        (StageStatus::Break, Some(program)) => format!("On a break: {}", program_card(program)),
        _ => "The program has not started yet.".to_string(),
    }
}

pub fn lobby(view: &LobbyView) -> String {
    let mut out = vec![
        format!("{} - {}", view.event_name, view.greeting),
        stage_line(view.stage_status, view.program.as_ref()),
    ];
    if !view.relevant_people.is_empty() {
        out.push("\nPeople you may want to meet:".into());
        out.extend(view.relevant_people.iter().map(|u| format!("  {}", person_line(u))));
    }
    if !view.partners.is_empty() {
        out.push("\nPartners:".into());
        out.extend(
            view.partners
                .iter()
                .map(|p| format!("  {}  {} {}", p.id, p.name, p.logo)),
        );
    }
    out.join("\n")
}

pub fn stage(view: &StageView) -> String {
    let mut out = vec![format!("[{}]", view.status.label())];
    out.push(stage_line(view.status, view.program.as_ref()));
    match &view.stream_url {
        Some(url) => out.push(format!("Stream: {url}")),
        None => out.push("No stream is playing.".into()),
    }
    out.join("\n")
}

pub fn profile(profile: &UserProfile) -> String {
    let mut out = vec![person_line(profile), details(&profile.details)];
    if !profile.interests.is_empty() {
        let names: Vec<&str> = profile.interests.iter().map(|i| i.name.as_str()).collect();
        out.push(format!("Interests:   {}", names.join(", ")));
    }
    if !profile.available_times.is_empty() {
        out.push(format!("Available:   {}", profile.available_times.join(" ")));
    }
    out.join("\n")
}

pub fn meeting_line(meeting: &Meeting, viewer: &UserId) -> String {
    let other = meeting.counterpart(viewer);
    let mut line = format!(
        "{}  {} at {} with {} [{}]",
        meeting.id,
        meeting.time,
        meeting.location,
        other.details.full_name(),
        meeting.status.label()
    );
    if let Some(message) = meeting.message.as_deref().filter(|m| !m.is_empty()) {
        line.push_str(&format!("\n    \"{message}\""));
    }
    line
}

pub fn meeting_board(board: &MeetingBoard, viewer: &UserId) -> String {
    if board.is_empty() {
        return "No meetings yet.".into();
    }
    let mut out = Vec::new();
    if !board.waiting.is_empty() {
        out.push("Waiting for your answer:".to_string());
        out.extend(board.waiting.iter().map(|m| format!("  {}", meeting_line(m, viewer))));
    }
    if !board.meetings.is_empty() {
        out.push("Your meetings:".to_string());
        out.extend(board.meetings.iter().map(|m| format!("  {}", meeting_line(m, viewer))));
    }
    out.join("\n")
}

pub fn conversations(conversations: &[Conversation]) -> String {
    if conversations.is_empty() {
        return "No conversations yet.".into();
    }
    conversations
        .iter()
        .map(|c| {
            let unread = if c.unread > 0 {
                format!(" [{} unread]", c.unread)
            } else {
                String::new()
            };
            format!(
                "{}  {}{unread}: {}",
                c.user.id,
                c.user.details.full_name(),
                c.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn thread(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "No messages yet.".into();
    }
    messages
        .iter()
        .map(|m| {
            format!(
                "[{}] {}: {}",
                m.created_at.format("%Y-%m-%d %H:%M"),
                m.sender.details.full_name(),
                m.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn partner_sections(sections: &PartnerSections) -> String {
    let mut out = Vec::new();
    for (tier, partners) in sections.sections() {
        out.push(format!("== {} ==", tier.title()));
        for partner in partners {
            out.push(format!("  {}  {} - {}", partner.id, partner.name, partner.slogan));
            let preview = admin_preview(partner);
            if !preview.shown.is_empty() {
                let names: Vec<String> =
                    preview.shown.iter().map(|u| u.details.full_name()).collect();
                let mut contacts = format!("    contacts: {}", names.join(", "));
                if preview.overflow > 0 {
                    contacts.push_str(&format!(" (+{})", preview.overflow));
                }
                out.push(contacts);
            }
        }
    }
    if out.is_empty() {
        return "No partners yet.".into();
    }
    out.join("\n")
}

pub fn booth(partner: &Partner) -> String {
    let mut out = vec![format!("{} - {}", partner.name, partner.slogan)];
    if !partner.description.is_empty() {
        out.push(partner.description.clone());
    }
    if !partner.website.is_empty() {
        out.push(format!("Website: {}", shared::links::format_link(&partner.website)));
    }
    let socials = [
        ("Facebook", &partner.facebook),
        ("LinkedIn", &partner.linkedin),
        ("Instagram", &partner.instagram),
        ("Twitter", &partner.twitter),
    ];
    for (label, link) in socials {
        if let Some(link) = link.as_deref().filter(|l| !l.is_empty()) {
            out.push(format!("{label}: {}", shared::links::format_link(link)));
        }
    }
    if !partner.materials.is_empty() {
        out.push("Materials:".into());
        for material in &partner.materials {
            let target = material_target(material).unwrap_or_else(|| "(embedded)".into());
            out.push(format!("  {}  {} {target}", material.id, material.name));
        }
    }
    if !partner.users.is_empty() {
        out.push("Team:".into());
        out.extend(partner.users.iter().map(|u| format!("  {}", person_line(u))));
    }
    out.join("\n")
}

pub fn interests(all: &[Interest], selected: &[String]) -> String {
    all.iter()
        .map(|interest| {
            let mark = if selected.iter().any(|id| id == interest.id.as_str()) {
                "[x]"
            } else {
                "[ ]"
            };
            format!("{mark} {}  {}", interest.id, interest.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn slots(all: &[String], selected: &[String]) -> String {
    all.iter()
        .map(|slot| {
            let mark = if selected.contains(slot) { "[x]" } else { "[ ]" };
            format!("{mark} {slot}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
