use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    exhibition::MaterialInput,
    media::MediaSource,
    meetings::MeetingProposal,
    onboarding::{OnboardingDraft, OnboardingStage},
    push::PushPayload,
    EventApi, EventSession, Page, SessionClient, SessionPhase,
};
use shared::{
    domain::{MaterialId, MeetingAction, PartnerId, User, UserDetails, UserId},
    protocol::{PartnerUpdate, UserPatch},
    schedule::{day_slot_labels, toggle, TimeSlot},
};
use storage::LocalStore;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, prepare_store_url};

#[derive(Parser, Debug)]
#[command(name = "attendee", about = "Attendee client for hosted events")]
struct Cli {
    /// Backend base url; overrides attendee.toml and the environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Where the login token is kept between runs.
    #[arg(long, global = true)]
    store_path: Option<String>,
    /// Key of the event to join.
    #[arg(long = "event", global = true)]
    event_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with a personal access code.
    Login { code: String },
    Logout,
    /// Show the signed-in user and the header counters.
    Whoami,
    /// Render a page by its query value: stage, people, meetings, exhibition.
    Open { page: Option<String> },
    Lobby,
    Stage,
    People {
        #[arg(long)]
        search: Option<String>,
        /// Extra pages to load after the first.
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    User { user_id: String },
    Meetings,
    Accept { meeting_id: String },
    Decline { meeting_id: String },
    /// Withdraw a proposal you sent.
    Cancel { meeting_id: String },
    /// Times another attendee is available for meetings.
    Times { user_id: String },
    Propose {
        user_id: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long)]
        message: Option<String>,
    },
    Conversations,
    Chat { user_id: String },
    Send { user_id: String, text: String },
    Partners,
    Booth { partner_id: String },
    /// Every bookable slot of the day.
    Slots,
    /// List the event's interests; `--toggle` flips and saves selections.
    Interests {
        #[arg(long)]
        toggle: Vec<String>,
    },
    Availability {
        #[arg(long)]
        toggle: Vec<String>,
        #[arg(long, conflicts_with = "clear")]
        all: bool,
        #[arg(long)]
        clear: bool,
    },
    /// Update profile details.
    Profile(ProfileArgs),
    /// Complete the first-time profile in one go.
    Onboard {
        #[command(flatten)]
        details: ProfileArgs,
        #[arg(long = "interest")]
        interests: Vec<String>,
        #[arg(long = "time")]
        times: Vec<String>,
        #[arg(long)]
        all_times: bool,
    },
    /// Stop showing the install-the-app hint.
    DismissAppDialog,
    /// Handle a push message given as its JSON payload, e.g.
    /// `{"title":"New message","type":"CHAT"}`.
    Push { payload: String },
    /// Register a push subscription read from a JSON file.
    PushSubscribe { file: PathBuf },
    PartnerEdit(PartnerArgs),
    MaterialSave {
        /// Existing material to edit; omitted creates a new one.
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        thumbnail: Option<String>,
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        embed: Option<bool>,
    },
    MaterialDelete { material_id: String },
}

#[derive(Args, Debug, Default)]
struct ProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    linkedin: Option<String>,
    #[arg(long)]
    hidden: Option<bool>,
    /// Hosted url or local file for the profile picture.
    #[arg(long)]
    picture: Option<String>,
}

impl ProfileArgs {
    fn apply(&self, details: &mut UserDetails) {
        let text_fields = [
            (&self.first_name, &mut details.first_name),
            (&self.last_name, &mut details.last_name),
            (&self.company, &mut details.company),
            (&self.email, &mut details.email),
        ];
        for (value, field) in text_fields {
            if let Some(value) = value {
                *field = value.trim().to_string();
            }
        }
        let optional_fields = [
            (&self.title, &mut details.title),
            (&self.description, &mut details.description),
            (&self.phone, &mut details.phone),
            (&self.linkedin, &mut details.linkedin),
        ];
        for (value, field) in optional_fields {
            if let Some(value) = value {
                *field = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
        }
        if let Some(hidden) = self.hidden {
            details.hidden = hidden;
        }
    }

    fn picture(&self) -> Option<MediaSource> {
        self.picture.as_deref().map(MediaSource::parse)
    }
}

#[derive(Args, Debug)]
struct PartnerArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    slogan: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    facebook: Option<String>,
    #[arg(long)]
    instagram: Option<String>,
    #[arg(long)]
    linkedin: Option<String>,
    #[arg(long)]
    twitter: Option<String>,
    /// Hosted url or local file for the logo.
    #[arg(long)]
    logo: Option<String>,
}

/// What a command needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Nothing,
    User,
    CompletedProfile,
}

impl Command {
    fn requirement(&self) -> Requirement {
        match self {
            Command::Slots => Requirement::Nothing,
            Command::Login { .. } | Command::Logout => Requirement::Nothing,
            Command::Whoami
            | Command::Profile(_)
            | Command::Onboard { .. }
            | Command::Interests { .. }
            | Command::Availability { .. }
            | Command::DismissAppDialog
            | Command::Push { .. }
            | Command::PushSubscribe { .. } => Requirement::User,
            _ => Requirement::CompletedProfile,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,attendee=info,client_core=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Command::Slots = cli.command {
        println!("{}", day_slot_labels().join("\n"));
        return Ok(());
    }

    let mut settings = load_settings();
    if let Some(v) = cli.api_base_url.clone() {
        settings.api_base_url = v;
    }
    if let Some(v) = cli.store_path.clone() {
        settings.store_path = v;
    }
    if let Some(v) = cli.event_key.clone() {
        settings.event_key = Some(v);
    }

    let store_url = prepare_store_url(&settings.store_path);
    let store = LocalStore::new(&store_url)
        .await
        .with_context(|| format!("failed to open local store '{store_url}'"))?;
    let client = SessionClient::new(&settings.api_base_url, Arc::new(store))
        .with_context(|| format!("invalid api base url '{}'", settings.api_base_url))?;

    if let Command::Logout = cli.command {
        forget_session(&client).await;
        println!("Logged out.");
        return Ok(());
    }

    let event_key = settings
        .event_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("no event selected; pass --event or set VES_EVENT_KEY"))?;
    let session = EventSession::new(EventApi::new(Arc::new(client)));
    debug!(api_base_url = %settings.api_base_url, %event_key, "starting attendee client");

    session.load_event(&event_key).await?;
    run(&session, cli.command).await
}

/// Logging out only touches the local store, so it works without an event
/// or a reachable backend.
async fn forget_session(client: &SessionClient) {
    client.set_token(None).await;
    info!("logged out");
}

async fn run(session: &EventSession, command: Command) -> Result<()> {
    let requirement = command.requirement();

    if let Command::Login { code } = &command {
        let user = session
            .restore_user(Some(code.as_str()))
            .await?
            .ok_or_else(|| anyhow!("login did not return a user"))?;
        println!("Logged in as {}", user.details.full_name());
        if session.phase().await == SessionPhase::Onboarding {
            println!("Complete your profile with `attendee onboard` to enter the event.");
        }
        return Ok(());
    }

    if requirement != Requirement::Nothing {
        if session.restore_user(None).await?.is_none() {
            bail!("not logged in; run `attendee login <code>` first");
        }
        session.refresh_counts().await;
    }
    if requirement == Requirement::CompletedProfile
        && session.phase().await == SessionPhase::Onboarding
    {
        bail!("your profile is not complete yet; run `attendee onboard` first");
    }

    match command {
        Command::Login { .. } | Command::Logout | Command::Slots => {}
        Command::Whoami => whoami(session).await?,
        Command::Open { page } => open_page(session, Page::from_query(page.as_deref())).await?,
        Command::Lobby => open_page(session, Page::Lobby).await?,
        Command::Stage => open_page(session, Page::Stage).await?,
        Command::People { search, more } => people(session, search.as_deref(), more).await?,
        Command::User { user_id } => {
            let profile = session.user_profile(&UserId::from(user_id)).await?;
            println!("{}", render::profile(&profile));
        }
        Command::Meetings => open_page(session, Page::Meetings).await?,
        Command::Accept { meeting_id } => {
            respond(session, &meeting_id, MeetingAction::Accept).await?
        }
        Command::Decline { meeting_id } => {
            respond(session, &meeting_id, MeetingAction::Decline).await?
        }
        Command::Cancel { meeting_id } => {
            respond(session, &meeting_id, MeetingAction::CancelProposal).await?
        }
        Command::Times { user_id } => {
            let times = session.available_times_of(&UserId::from(user_id)).await?;
            if times.is_empty() {
                println!("No available times.");
            } else {
                println!("{}", times.join("\n"));
            }
        }
        Command::Propose {
            user_id,
            time,
            location,
            message,
        } => {
            session
                .propose_meeting(MeetingProposal {
                    receiver: UserId::from(user_id),
                    time,
                    location,
                    message,
                })
                .await?;
            println!("Meeting proposal sent.");
        }
        Command::Conversations => {
            let conversations = session.snapshot().await.conversations;
            println!("{}", render::conversations(&conversations));
        }
        Command::Chat { user_id } => {
            let thread = session.chat_thread(&UserId::from(user_id)).await?;
            println!("{}", render::thread(&thread));
        }
        Command::Send { user_id, text } => {
            let thread = session
                .send_chat_message(&UserId::from(user_id), &text)
                .await?;
            println!("{}", render::thread(&thread));
        }
        Command::Partners => open_page(session, Page::Exhibition).await?,
        Command::Booth { partner_id } => {
            let partner = session.visit_booth(&PartnerId::from(partner_id)).await?;
            println!("{}", render::booth(&partner));
        }
        Command::Interests { toggle: ids } => interests(session, &ids).await?,
        Command::Availability { toggle: slots, all, clear } => {
            availability(session, &slots, all, clear).await?
        }
        Command::Profile(args) => {
            let user = current_user(session).await?;
            let mut details = user.details.clone();
            args.apply(&mut details);
            let user = session
                .save_details(UserPatch::from_details(&details), args.picture())
                .await?;
            println!("{}", render::details(&user.details));
        }
        Command::Onboard {
            details,
            interests,
            times,
            all_times,
        } => onboard(session, details, interests, times, all_times).await?,
        Command::DismissAppDialog => {
            session.mark_app_dialog_seen().await?;
        }
        Command::Push { payload } => {
            let payload = PushPayload::from_json(&payload)?;
            if !payload.title.is_empty() {
                println!("{}", payload.title);
            }
            if !payload.body.is_empty() {
                println!("{}", payload.body);
            }
            session.handle_push_payload(&payload).await?;
            println!("{}", render::header(&session.snapshot().await));
        }
        Command::PushSubscribe { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let subscription: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("'{}' is not valid JSON", file.display()))?;
            session.register_push_subscription(subscription).await?;
            info!("push subscription registered");
        }
        Command::PartnerEdit(args) => edit_partner(session, args).await?,
        Command::MaterialSave {
            id,
            name,
            thumbnail,
            file,
            link,
            embed,
        } => {
            let partner = session
                .save_material(MaterialInput {
                    existing: id.map(MaterialId::from),
                    name,
                    thumbnail: thumbnail.as_deref().map(MediaSource::parse),
                    file: file.as_deref().map(MediaSource::parse),
                    link,
                    as_embed: embed,
                })
                .await?;
            println!("{}", render::booth(&partner));
        }
        Command::MaterialDelete { material_id } => {
            let partner = session
                .delete_material(&MaterialId::from(material_id))
                .await?;
            println!("{}", render::booth(&partner));
        }
    }

    Ok(())
}

async fn current_user(session: &EventSession) -> Result<User> {
    session
        .snapshot()
        .await
        .user
        .ok_or_else(|| anyhow!("not logged in"))
}

async fn whoami(session: &EventSession) -> Result<()> {
    let state = session.snapshot().await;
    println!("{}", render::header(&state));
    if let Some(user) = &state.user {
        println!("{}", render::details(&user.details));
        if !user.details.logged_in {
            println!("Profile not completed yet.");
        }
    }
    Ok(())
}

async fn open_page(session: &EventSession, page: Page) -> Result<()> {
    println!("{}", render::header(&session.snapshot().await));
    println!("--- {} ---", page.label());
    match page {
        Page::Lobby => println!("{}", render::lobby(&session.lobby().await?)),
        Page::Stage => println!("{}", render::stage(&session.stage().await?)),
        Page::People => people(session, None, 0).await?,
        Page::Meetings => {
            let user = current_user(session).await?;
            let board = session.meeting_board().await?;
            println!("{}", render::meeting_board(&board, &user.id));
        }
        Page::Exhibition => {
            println!("{}", render::partner_sections(&session.partner_sections().await?))
        }
    }
    Ok(())
}

async fn people(session: &EventSession, search: Option<&str>, more: usize) -> Result<()> {
    let mut directory = session.people_directory().await?;
    if let Some(term) = search {
        directory.search(session.api(), term).await?;
    }
    for _ in 0..more {
        if directory.load_more(session.api()).await? == 0 {
            break;
        }
    }
    if directory.users().is_empty() {
        println!("Nobody found.");
    }
    for user in directory.users() {
        println!("{}", render::person_line(user));
    }
    Ok(())
}

async fn respond(session: &EventSession, meeting_id: &str, action: MeetingAction) -> Result<()> {
    let user = current_user(session).await?;
    let board = session.meeting_board().await?;
    let meeting = board
        .find(meeting_id)
        .ok_or_else(|| anyhow!("meeting {meeting_id} not found"))?;
    if !meeting.actions_for(&user.id).contains(&action) {
        bail!(
            "meeting {meeting_id} is {} and cannot be changed that way",
            meeting.status.label()
        );
    }
    let board = session.respond_to_meeting(meeting, action).await?;
    println!("{}", render::meeting_board(&board, &user.id));
    Ok(())
}

async fn interests(session: &EventSession, toggles: &[String]) -> Result<()> {
    let all = session.event_interests().await?;
    let mut selected: Vec<String> = current_user(session)
        .await?
        .interests
        .iter()
        .map(|id| id.to_string())
        .collect();
    if !toggles.is_empty() {
        for id in toggles {
            if !all.iter().any(|interest| interest.id.as_str() == id) {
                bail!("unknown interest {id}");
            }
            toggle(&mut selected, id);
        }
        let user = session.save_interests(selected).await?;
        selected = user.interests.iter().map(|id| id.to_string()).collect();
    }
    println!("{}", render::interests(&all, &selected));
    Ok(())
}

fn check_slot(slot: &str) -> Result<()> {
    let parsed: TimeSlot = slot.parse()?;
    if !day_slot_labels().contains(&parsed.label()) {
        bail!("'{slot}' is outside the bookable day");
    }
    Ok(())
}

async fn availability(
    session: &EventSession,
    toggles: &[String],
    all: bool,
    clear: bool,
) -> Result<()> {
    let mut selected = current_user(session).await?.available_times;
    let changed = all || clear || !toggles.is_empty();
    if all {
        selected = day_slot_labels();
    }
    if clear {
        selected.clear();
    }
    for slot in toggles {
        check_slot(slot)?;
        toggle(&mut selected, slot);
    }
    if changed {
        selected = session.save_availability(selected).await?.available_times;
    }
    println!("{}", render::slots(&day_slot_labels(), &selected));
    Ok(())
}

async fn onboard(
    session: &EventSession,
    details: ProfileArgs,
    interests: Vec<String>,
    times: Vec<String>,
    all_times: bool,
) -> Result<()> {
    let user = current_user(session).await?;
    let mut draft = OnboardingDraft::for_user(&user);

    for stage in OnboardingStage::ALL {
        debug!(stage = stage.name(), "onboarding");
        match stage {
            OnboardingStage::Details => {
                details.apply(&mut draft.details);
                draft.picture = details.picture();
            }
            OnboardingStage::Interests => {
                for id in &interests {
                    draft.toggle_interest(id);
                }
            }
            OnboardingStage::Availability => {
                if all_times {
                    draft.select_all_times();
                }
                for slot in &times {
                    check_slot(slot)?;
                    draft.toggle_time(slot);
                }
            }
        }
    }

    let user = session.complete_onboarding(draft).await?;
    println!("Welcome, {}!", user.details.first_name);
    Ok(())
}

async fn edit_partner(session: &EventSession, args: PartnerArgs) -> Result<()> {
    let partner = session.own_partner().await?;
    let update = PartnerUpdate {
        logo: None,
        name: args.name.unwrap_or(partner.name),
        description: args.description.unwrap_or(partner.description),
        slogan: args.slogan.unwrap_or(partner.slogan),
        website: args.website.unwrap_or(partner.website),
        facebook: args.facebook.or(partner.facebook),
        instagram: args.instagram.or(partner.instagram),
        linkedin: args.linkedin.or(partner.linkedin),
        twitter: args.twitter.or(partner.twitter),
    };
    let logo = args.logo.as_deref().map(MediaSource::parse);
    session.save_partner_profile(update, logo).await?;
    let partner = session.own_partner().await?;
    println!("{}", render::booth(&partner));
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
