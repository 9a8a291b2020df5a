//! Command-line surface. Everything here is rendering and argument
//! plumbing; decisions belong to the library modules.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::api::dto::{Page, SearchParams};
use crate::api::{HttpPortalApi, PortalApi};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::AppError;
use crate::models::{
    ApplicationType, Institution, Profile, ProfileUpdate, Scholarship, SettingsPatch,
};
use crate::search::SearchDebouncer;
use crate::services::{
    AccountService, CollegeTracking, ScholarshipTracking, Tracker, TrackerView,
};
use crate::session::SessionStore;
use crate::workflow::{CollegeStatus, ScholarshipStatus, Stage, Tint, available_actions};

const RESET: &str = "\x1b[0m";

fn paint(tint: Tint) -> &'static str {
    match tint {
        Tint::Gray => "\x1b[90m",
        Tint::Blue => "\x1b[34m",
        Tint::Amber => "\x1b[33m",
        Tint::Green => "\x1b[32m",
        Tint::Red => "\x1b[31m",
    }
}

#[derive(Parser)]
#[command(
    name = "campustrack",
    version,
    about = "College and scholarship application tracking from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EntityKind {
    College,
    Scholarship,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Sign in and store the session token
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// List featured institutions
    Featured,
    /// Search institutions; with no query, start a live search prompt
    Search {
        query: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one institution
    Show { id: Uuid },
    /// List institutions in a state
    ByState {
        code: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Browse scholarships
    Scholarships {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one scholarship
    Scholarship { id: Uuid },
    /// Start tracking an institution or scholarship
    Track {
        kind: EntityKind,
        id: Uuid,
        /// College only: early_decision, early_action, regular_decision, rolling
        #[arg(long = "type")]
        application_type: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an application forward; omit the status to see what's offered
    Advance {
        kind: EntityKind,
        id: Uuid,
        to: Option<String>,
    },
    /// Replace the notes on an application
    Note {
        kind: EntityKind,
        id: Uuid,
        text: String,
    },
    /// Record the awarded amount on an accepted scholarship
    Award { id: Uuid, amount: f64 },
    /// Stop tracking an application (permanent, asks for confirmation)
    Untrack {
        kind: EntityKind,
        id: Uuid,
        #[arg(long)]
        yes: bool,
    },
    /// Show the tracked-application dashboard
    Dashboard { kind: EntityKind },
    /// Show or update the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Upload profile media
    Upload {
        #[command(subcommand)]
        target: UploadTarget,
    },
    /// Show or change notification settings
    Settings {
        #[arg(long)]
        email_notifications: Option<bool>,
        #[arg(long)]
        deadline_reminders: Option<bool>,
        #[arg(long)]
        profile_visible: Option<bool>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        graduation_year: Option<i32>,
        #[arg(long)]
        gpa: Option<f64>,
        #[arg(long)]
        intended_major: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
}

#[derive(Subcommand)]
enum UploadTarget {
    Headshot { path: PathBuf },
    /// Uploads the resume and lets the backend update the profile from it
    Resume { path: PathBuf },
}

pub async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let api: Arc<dyn PortalApi> = Arc::new(HttpPortalApi::new(&config)?);
    let store = SessionStore::new(config.session_file.clone());
    let mut account = AccountService::new(api.clone(), store)?;

    let result = execute(cli.command, api, &mut account).await;
    // A 401 anywhere means the stored token is dead; drop it.
    result.map_err(|e| account.absorb(e))
}

async fn execute(
    command: Command,
    api: Arc<dyn PortalApi>,
    account: &mut AccountService,
) -> Result<(), AppError> {
    match command {
        Command::Register {
            email,
            password,
            full_name,
        } => {
            let created = account.register(email, password, full_name).await?;
            println!(
                "Account created for {}. Sign in with: campustrack login {}",
                created.email, created.email
            );
        }
        Command::Login { email, password } => {
            account.login(email, password).await?;
            println!("Signed in.");
        }
        Command::Logout => {
            account.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => {
            let user = account.current_user().await?;
            match user.full_name {
                Some(name) => println!("{} <{}>", name, user.email),
                None => println!("{}", user.email),
            }
        }
        Command::Featured => {
            let institutions = api.featured_institutions().await?;
            if institutions.is_empty() {
                println!("No featured institutions right now.");
            }
            for institution in &institutions {
                print_institution_row(institution);
            }
        }
        Command::Search { query, state, page } => match query {
            Some(query) => {
                let mut params = SearchParams::new(query);
                params.state = state;
                params.page = page;
                let results = api.search_institutions(&params).await?;
                for institution in &results.items {
                    print_institution_row(institution);
                }
                print_page_footer(&results);
            }
            None => live_search(api, state).await?,
        },
        Command::Show { id } => {
            let institution = api.institution(id).await?;
            print_institution_detail(&institution);
        }
        Command::ByState { code, page } => {
            let results = api.institutions_by_state(&code, page).await?;
            for institution in &results.items {
                print_institution_row(institution);
            }
            print_page_footer(&results);
        }
        Command::Scholarships { page } => {
            let results = api.scholarships(page).await?;
            for scholarship in &results.items {
                print_scholarship_row(scholarship);
            }
            print_page_footer(&results);
        }
        Command::Scholarship { id } => {
            let scholarship = api.scholarship(id).await?;
            print_scholarship_detail(&scholarship);
        }
        Command::Track {
            kind,
            id,
            application_type,
            notes,
        } => {
            let token = account.require_token()?.to_string();
            match kind {
                EntityKind::College => {
                    let application_type = application_type
                        .map(|raw| {
                            ApplicationType::parse(&raw).ok_or_else(|| AppError::Validation {
                                message: format!(
                                    "Unknown application type '{}'. Use one of: early_decision, \
                                     early_action, regular_decision, rolling",
                                    raw
                                ),
                                field_errors: Vec::new(),
                            })
                        })
                        .transpose()?;
                    let tracker = college_tracker(api.clone());
                    let created = tracker.track(&token, id, application_type, notes).await?;
                    println!(
                        "Tracking {} (application {}).",
                        created.subject_name, created.id
                    );
                }
                EntityKind::Scholarship => {
                    if application_type.is_some() {
                        return Err(AppError::Validation {
                            message: "--type only applies to college applications".to_string(),
                            field_errors: Vec::new(),
                        });
                    }
                    let tracker = scholarship_tracker(api.clone());
                    let created = tracker.track(&token, id, None, notes).await?;
                    println!(
                        "Tracking {} (application {}).",
                        created.subject_name, created.id
                    );
                }
            }
        }
        Command::Advance { kind, id, to } => {
            let token = account.require_token()?.to_string();
            match kind {
                EntityKind::College => {
                    advance_command(&college_tracker(api.clone()), &token, id, to).await?
                }
                EntityKind::Scholarship => {
                    advance_command(&scholarship_tracker(api.clone()), &token, id, to).await?
                }
            }
        }
        Command::Note { kind, id, text } => {
            let token = account.require_token()?.to_string();
            match kind {
                EntityKind::College => {
                    college_tracker(api.clone()).set_notes(&token, id, text).await?;
                }
                EntityKind::Scholarship => {
                    scholarship_tracker(api.clone())
                        .set_notes(&token, id, text)
                        .await?;
                }
            }
            println!("Notes saved.");
        }
        Command::Award { id, amount } => {
            let token = account.require_token()?.to_string();
            let updated = scholarship_tracker(api.clone())
                .record_award(&token, id, amount)
                .await?;
            println!(
                "Recorded a ${:.0} award for {}.",
                amount, updated.subject_name
            );
        }
        Command::Untrack { kind, id, yes } => {
            let token = account.require_token()?.to_string();
            if !yes
                && !confirm("This permanently deletes the application and its notes. Continue?")?
            {
                println!("Cancelled.");
                return Ok(());
            }
            match kind {
                EntityKind::College => {
                    let view = college_tracker(api.clone()).untrack(&token, id).await?;
                    println!("Stopped tracking. {} applications left.", view.applications.len());
                }
                EntityKind::Scholarship => {
                    let view = scholarship_tracker(api.clone()).untrack(&token, id).await?;
                    println!("Stopped tracking. {} applications left.", view.applications.len());
                }
            }
        }
        Command::Dashboard { kind } => {
            let token = account.require_token()?.to_string();
            match kind {
                EntityKind::College => {
                    let view = college_tracker(api.clone()).overview(&token).await?;
                    render_applications(&view);
                    render_dashboard(&view.dashboard);
                }
                EntityKind::Scholarship => {
                    let view = scholarship_tracker(api.clone()).overview(&token).await?;
                    render_applications(&view);
                    render_dashboard(&view.dashboard);
                    println!(
                        "Potential value still in play: ${:.0}",
                        view.total_potential_value()
                    );
                }
            }
        }
        Command::Profile { action } => {
            let token = account.require_token()?.to_string();
            match action {
                ProfileAction::Show => {
                    let profile = api.profile(&token).await?;
                    print_profile(&profile);
                }
                ProfileAction::Update {
                    full_name,
                    graduation_year,
                    gpa,
                    intended_major,
                    state,
                } => {
                    let profile = api
                        .update_profile(
                            &token,
                            ProfileUpdate {
                                full_name,
                                graduation_year,
                                gpa,
                                intended_major,
                                state,
                            },
                        )
                        .await?;
                    println!("Profile updated.");
                    print_profile(&profile);
                }
            }
        }
        Command::Upload { target } => {
            let token = account.require_token()?.to_string();
            let profile = match target {
                UploadTarget::Headshot { path } => {
                    let (filename, bytes) = read_upload(&path)?;
                    api.upload_headshot(&token, filename, bytes).await?
                }
                UploadTarget::Resume { path } => {
                    let (filename, bytes) = read_upload(&path)?;
                    api.upload_resume(&token, filename, bytes).await?
                }
            };
            println!("Upload complete.");
            print_profile(&profile);
        }
        Command::Settings {
            email_notifications,
            deadline_reminders,
            profile_visible,
        } => {
            let token = account.require_token()?.to_string();
            let no_changes = email_notifications.is_none()
                && deadline_reminders.is_none()
                && profile_visible.is_none();
            let settings = if no_changes {
                api.settings(&token).await?
            } else {
                api.update_settings(
                    &token,
                    SettingsPatch {
                        email_notifications,
                        deadline_reminders,
                        profile_visible,
                    },
                )
                .await?
            };
            println!("email notifications: {}", settings.email_notifications);
            println!("deadline reminders:  {}", settings.deadline_reminders);
            println!("profile visible:     {}", settings.profile_visible);
        }
    }
    Ok(())
}

fn college_tracker(api: Arc<dyn PortalApi>) -> Tracker<CollegeStatus> {
    Tracker::new(Box::new(CollegeTracking(api)))
}

fn scholarship_tracker(api: Arc<dyn PortalApi>) -> Tracker<ScholarshipStatus> {
    Tracker::new(Box::new(ScholarshipTracking(api)))
}

async fn advance_command<S: Stage>(
    tracker: &Tracker<S>,
    token: &str,
    id: Uuid,
    to: Option<String>,
) -> Result<(), AppError> {
    match to {
        None => {
            let app = tracker.find(token, id).await?;
            let actions = available_actions(app.status);
            if actions.is_empty() {
                println!(
                    "{} is {} — nothing further to do.",
                    app.subject_name,
                    app.status.label()
                );
            } else {
                println!("{} is {}. Next steps:", app.subject_name, app.status.label());
                for action in actions {
                    println!("  {:<24} advance ... {}", action.label, action.next.as_str());
                }
            }
        }
        Some(raw) => {
            let requested = S::parse(&raw).ok_or_else(|| AppError::Validation {
                message: format!("Unknown status '{}'", raw),
                field_errors: Vec::new(),
            })?;
            let view = tracker.advance(token, id, requested).await?;
            println!("Moved to {}.", requested.label());
            render_dashboard(&view.dashboard);
        }
    }
    Ok(())
}

/// Live search prompt. Each typed line supersedes the previous query; a
/// line that is superseded before its debounce delay elapses, or whose
/// response comes back after a newer line, prints nothing.
async fn live_search(api: Arc<dyn PortalApi>, state: Option<String>) -> Result<(), AppError> {
    let debouncer = SearchDebouncer::new(Duration::from_millis(300));
    println!("Type to search institutions; empty line to quit.");
    let stdin = io::stdin();
    let mut pending = Vec::new();
    for line in stdin.lock().lines() {
        let query = line?.trim().to_string();
        if query.is_empty() {
            break;
        }
        let ticket = debouncer.submit();
        let debouncer = debouncer.clone();
        let api = api.clone();
        let state = state.clone();
        pending.push(tokio::spawn(async move {
            let mut params = SearchParams::new(query.clone());
            params.state = state;
            let outcome = debouncer
                .run(ticket, || async { api.search_institutions(&params).await })
                .await;
            match outcome {
                None => {} // superseded by newer input
                Some(Ok(results)) => {
                    println!("results for \"{}\":", query);
                    for institution in &results.items {
                        print_institution_row(institution);
                    }
                }
                Some(Err(e)) => eprintln!("{}", e.user_message()),
            }
        }));
    }
    for task in pending {
        let _ = task.await;
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn read_upload(path: &Path) -> Result<(String, Vec<u8>), AppError> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok((filename, bytes))
}

fn print_institution_row(institution: &Institution) {
    let deadline = institution
        .application_deadline
        .map(|d| d.to_string())
        .unwrap_or_else(|| "—".to_string());
    println!(
        "{}  {:<32} {}, {}  deadline {}",
        institution.id, institution.name, institution.city, institution.state, deadline
    );
}

fn print_institution_detail(institution: &Institution) {
    println!("{}", institution.name);
    println!("  {}, {}", institution.city, institution.state);
    if let Some(website) = &institution.website {
        println!("  {}", website);
    }
    if let Some(rate) = institution.acceptance_rate {
        println!("  acceptance rate: {:.0}%", rate * 100.0);
    }
    if let Some(tuition) = institution.tuition_in_state {
        println!("  tuition (in state): ${:.0}", tuition);
    }
    if let Some(tuition) = institution.tuition_out_of_state {
        println!("  tuition (out of state): ${:.0}", tuition);
    }
    if let Some(deadline) = institution.application_deadline {
        println!("  application deadline: {}", deadline);
    }
}

fn print_scholarship_row(scholarship: &Scholarship) {
    let amount = scholarship
        .amount_exact
        .map(|a| format!("${:.0}", a))
        .or_else(|| scholarship.amount_max.map(|a| format!("up to ${:.0}", a)))
        .unwrap_or_else(|| "amount varies".to_string());
    let deadline = scholarship
        .deadline
        .map(|d| d.to_string())
        .unwrap_or_else(|| "—".to_string());
    println!(
        "{}  {:<32} {}  deadline {}",
        scholarship.id, scholarship.name, amount, deadline
    );
}

fn print_scholarship_detail(scholarship: &Scholarship) {
    println!("{} — {}", scholarship.name, scholarship.organization);
    println!("  {}", scholarship.description);
    if let Some(amount) = scholarship.amount_exact {
        println!("  award: ${:.0}", amount);
    } else if let Some(amount) = scholarship.amount_max {
        println!("  award: up to ${:.0}", amount);
    }
    if let Some(deadline) = scholarship.deadline {
        println!("  deadline: {}", deadline);
    }
    if let Some(website) = &scholarship.website {
        println!("  {}", website);
    }
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.full_name.as_deref().unwrap_or("(no name)"));
    println!("  {}", profile.email);
    if let Some(year) = profile.graduation_year {
        println!("  class of {}", year);
    }
    if let Some(gpa) = profile.gpa {
        println!("  GPA {:.2}", gpa);
    }
    if let Some(major) = &profile.intended_major {
        println!("  intended major: {}", major);
    }
    if let Some(state) = &profile.state {
        println!("  state: {}", state);
    }
    if let Some(url) = &profile.headshot_url {
        println!("  headshot: {}", url);
    }
    if let Some(url) = &profile.resume_url {
        println!("  resume: {}", url);
    }
}

fn print_page_footer<T>(page: &Page<T>) {
    println!(
        "page {} — {} of {} total",
        page.page,
        page.items.len(),
        page.total
    );
    if page.has_more() {
        println!("more available with --page {}", page.page + 1);
    }
}

fn render_applications<S: Stage>(view: &TrackerView<S>) {
    if view.applications.is_empty() {
        println!("Nothing tracked yet.");
        return;
    }
    for app in &view.applications {
        let deadline = app
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{}  {:<32} {}{:<12}{} deadline {}",
            app.id,
            app.subject_name,
            paint(app.status.tint()),
            app.status.label(),
            RESET,
            deadline
        );
    }
    println!();
}

fn render_dashboard<S: Stage>(dashboard: &Dashboard<S>) {
    println!("By status:");
    for entry in &dashboard.summary {
        if entry.count > 0 {
            println!(
                "  {}{:<12}{} {}",
                paint(entry.status.tint()),
                entry.status.label(),
                RESET,
                entry.count
            );
        }
    }
    if !dashboard.upcoming_deadlines.is_empty() {
        println!("Due soon:");
        for entry in &dashboard.upcoming_deadlines {
            let when = match entry.days_left {
                0 => "due today".to_string(),
                1 => "due tomorrow".to_string(),
                n => format!("in {} days", n),
            };
            println!("  {:<32} {}", entry.application.subject_name, when);
        }
    }
    if !dashboard.overdue.is_empty() {
        println!("Overdue:");
        for entry in &dashboard.overdue {
            println!(
                "  {:<32} {} days past",
                entry.application.subject_name,
                -entry.days_left
            );
        }
    }
}
