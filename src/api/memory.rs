//! In-memory stand-in for the portal backend, used by tests and offline
//! development. Behaves like the real service at the contract level:
//! duplicate tracking is rejected, unknown tokens are 401s, and status
//! updates are accepted as-is (the backend does not police transitions).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::api::dto::{LoginRequest, Page, RegisterRequest, SearchParams};
use crate::api::PortalApi;
use crate::error::AppError;
use crate::models::{
    Institution, NewApplicationRequest, Profile, ProfileUpdate, Scholarship, Settings,
    SettingsPatch, TrackedApplication, UpdateApplicationRequest, UserAccount,
};
use crate::workflow::{CollegeStatus, ScholarshipStatus, Stage};

struct StoredUser {
    id: Uuid,
    email: String,
    password: String,
    full_name: Option<String>,
}

#[derive(Default)]
struct State {
    users: Vec<StoredUser>,
    tokens: HashMap<String, Uuid>,
    institutions: Vec<Institution>,
    scholarships: Vec<Scholarship>,
    college_apps: Vec<(Uuid, TrackedApplication<CollegeStatus>)>,
    scholarship_apps: Vec<(Uuid, TrackedApplication<ScholarshipStatus>)>,
    profiles: HashMap<Uuid, Profile>,
    settings: HashMap<Uuid, Settings>,
}

#[derive(Default)]
pub struct InMemoryPortalApi {
    state: Mutex<State>,
}

impl InMemoryPortalApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("state mutex poisoned")
    }

    pub fn add_institution(&self, institution: Institution) {
        self.state().institutions.push(institution);
    }

    pub fn add_scholarship(&self, scholarship: Scholarship) {
        self.state().scholarships.push(scholarship);
    }

    /// Invalidates a previously issued token, simulating expiry.
    pub fn revoke_token(&self, token: &str) {
        self.state().tokens.remove(token);
    }
}

fn auth_user(state: &State, token: &str) -> Result<Uuid, AppError> {
    state
        .tokens
        .get(token)
        .copied()
        .ok_or(AppError::Unauthorized)
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1);
    let start = (page.saturating_sub(1) as usize) * per_page as usize;
    let slice = items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect();
    Page {
        items: slice,
        total: items.len() as u64,
        page,
        per_page,
    }
}

fn create_application<S: Stage>(
    apps: &mut Vec<(Uuid, TrackedApplication<S>)>,
    user: Uuid,
    req: &NewApplicationRequest,
    subject_name: String,
    duplicate_message: &str,
) -> Result<TrackedApplication<S>, AppError> {
    if apps
        .iter()
        .any(|(owner, app)| *owner == user && app.subject_id == req.subject_id)
    {
        return Err(AppError::AlreadyTracked(duplicate_message.to_string()));
    }
    let now = Utc::now();
    let app = TrackedApplication {
        id: Uuid::new_v4(),
        subject_id: req.subject_id,
        subject_name,
        status: S::initial(),
        deadline: None,
        notes: req.notes.clone(),
        application_type: req.application_type,
        award_amount: None,
        amount_exact: None,
        amount_max: None,
        created_at: now,
        updated_at: now,
    };
    apps.push((user, app.clone()));
    Ok(app)
}

fn update_application<S: Stage>(
    apps: &mut [(Uuid, TrackedApplication<S>)],
    user: Uuid,
    id: Uuid,
    req: UpdateApplicationRequest<S>,
) -> Result<TrackedApplication<S>, AppError> {
    let app = apps
        .iter_mut()
        .find(|(owner, app)| *owner == user && app.id == id)
        .map(|(_, app)| app)
        .ok_or(AppError::NotFound)?;
    if let Some(status) = req.status {
        app.status = status;
    }
    if let Some(notes) = req.notes {
        app.notes = Some(notes);
    }
    if let Some(award) = req.award_amount {
        app.award_amount = Some(award);
    }
    app.updated_at = Utc::now();
    Ok(app.clone())
}

fn delete_application<S: Stage>(
    apps: &mut Vec<(Uuid, TrackedApplication<S>)>,
    user: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    let before = apps.len();
    apps.retain(|(owner, app)| !(*owner == user && app.id == id));
    if apps.len() == before {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl PortalApi for InMemoryPortalApi {
    async fn register(&self, req: RegisterRequest) -> Result<UserAccount, AppError> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.email == req.email) {
            return Err(AppError::Validation {
                message: "An account with this email already exists".to_string(),
                field_errors: Vec::new(),
            });
        }
        let id = Uuid::new_v4();
        state.users.push(StoredUser {
            id,
            email: req.email.clone(),
            password: req.password,
            full_name: req.full_name.clone(),
        });
        state.profiles.insert(
            id,
            Profile {
                id,
                email: req.email.clone(),
                full_name: req.full_name.clone(),
                graduation_year: None,
                gpa: None,
                intended_major: None,
                state: None,
                headshot_url: None,
                resume_url: None,
            },
        );
        state.settings.insert(
            id,
            Settings {
                email_notifications: true,
                deadline_reminders: true,
                profile_visible: false,
            },
        );
        Ok(UserAccount {
            id,
            email: req.email,
            full_name: req.full_name,
        })
    }

    async fn login(&self, req: LoginRequest) -> Result<String, AppError> {
        let mut state = self.state();
        let user = state
            .users
            .iter()
            .find(|u| u.email == req.email && u.password == req.password)
            .map(|u| u.id)
            .ok_or_else(|| AppError::Validation {
                message: "Incorrect email or password".to_string(),
                field_errors: Vec::new(),
            })?;
        let token = format!("token-{}", Uuid::new_v4());
        state.tokens.insert(token.clone(), user);
        Ok(token)
    }

    async fn current_user(&self, token: &str) -> Result<UserAccount, AppError> {
        let state = self.state();
        let user = auth_user(&state, token)?;
        let stored = state
            .users
            .iter()
            .find(|u| u.id == user)
            .ok_or(AppError::NotFound)?;
        Ok(UserAccount {
            id: stored.id,
            email: stored.email.clone(),
            full_name: stored.full_name.clone(),
        })
    }

    async fn featured_institutions(&self) -> Result<Vec<Institution>, AppError> {
        Ok(self
            .state()
            .institutions
            .iter()
            .filter(|i| i.featured)
            .cloned()
            .collect())
    }

    async fn search_institutions(
        &self,
        params: &SearchParams,
    ) -> Result<Page<Institution>, AppError> {
        let state = self.state();
        let needle = params.query.to_lowercase();
        let matches: Vec<Institution> = state
            .institutions
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .filter(|i| {
                params
                    .state
                    .as_ref()
                    .is_none_or(|code| i.state.eq_ignore_ascii_case(code))
            })
            .cloned()
            .collect();
        Ok(page_of(&matches, params.page, params.per_page))
    }

    async fn institution(&self, id: Uuid) -> Result<Institution, AppError> {
        self.state()
            .institutions
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn institutions_by_state(
        &self,
        code: &str,
        page: u32,
    ) -> Result<Page<Institution>, AppError> {
        let state = self.state();
        let matches: Vec<Institution> = state
            .institutions
            .iter()
            .filter(|i| i.state.eq_ignore_ascii_case(code))
            .cloned()
            .collect();
        Ok(page_of(&matches, page, 20))
    }

    async fn scholarships(&self, page: u32) -> Result<Page<Scholarship>, AppError> {
        let state = self.state();
        Ok(page_of(&state.scholarships, page, 20))
    }

    async fn scholarship(&self, id: Uuid) -> Result<Scholarship, AppError> {
        self.state()
            .scholarships
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn college_dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<CollegeStatus>>, AppError> {
        let state = self.state();
        let user = auth_user(&state, token)?;
        Ok(state
            .college_apps
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, app)| {
                let mut app = app.clone();
                // Deadline belongs to the institution and is read through.
                if let Some(subject) = state.institutions.iter().find(|i| i.id == app.subject_id) {
                    app.deadline = subject.application_deadline;
                }
                app
            })
            .collect())
    }

    async fn track_college(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<CollegeStatus>, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        let subject_name = state
            .institutions
            .iter()
            .find(|i| i.id == req.subject_id)
            .map(|i| i.name.clone())
            .ok_or(AppError::NotFound)?;
        create_application(
            &mut state.college_apps,
            user,
            &req,
            subject_name,
            "You are already tracking this institution",
        )
    }

    async fn update_college(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<CollegeStatus>,
    ) -> Result<TrackedApplication<CollegeStatus>, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        update_application(&mut state.college_apps, user, id, req)
    }

    async fn untrack_college(&self, token: &str, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        delete_application(&mut state.college_apps, user, id)
    }

    async fn scholarship_dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<ScholarshipStatus>>, AppError> {
        let state = self.state();
        let user = auth_user(&state, token)?;
        Ok(state
            .scholarship_apps
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, app)| {
                let mut app = app.clone();
                // Deadline and amounts are the scholarship's, read through.
                if let Some(subject) = state.scholarships.iter().find(|s| s.id == app.subject_id) {
                    app.deadline = subject.deadline;
                    app.amount_exact = subject.amount_exact;
                    app.amount_max = subject.amount_max;
                }
                app
            })
            .collect())
    }

    async fn track_scholarship(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        let subject_name = state
            .scholarships
            .iter()
            .find(|s| s.id == req.subject_id)
            .map(|s| s.name.clone())
            .ok_or(AppError::NotFound)?;
        create_application(
            &mut state.scholarship_apps,
            user,
            &req,
            subject_name,
            "You are already tracking this scholarship",
        )
    }

    async fn update_scholarship(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<ScholarshipStatus>,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        update_application(&mut state.scholarship_apps, user, id, req)
    }

    async fn untrack_scholarship(&self, token: &str, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        delete_application(&mut state.scholarship_apps, user, id)
    }

    async fn profile(&self, token: &str) -> Result<Profile, AppError> {
        let state = self.state();
        let user = auth_user(&state, token)?;
        state.profiles.get(&user).cloned().ok_or(AppError::NotFound)
    }

    async fn update_profile(&self, token: &str, req: ProfileUpdate) -> Result<Profile, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        let profile = state.profiles.get_mut(&user).ok_or(AppError::NotFound)?;
        if let Some(full_name) = req.full_name {
            profile.full_name = Some(full_name);
        }
        if let Some(year) = req.graduation_year {
            profile.graduation_year = Some(year);
        }
        if let Some(gpa) = req.gpa {
            profile.gpa = Some(gpa);
        }
        if let Some(major) = req.intended_major {
            profile.intended_major = Some(major);
        }
        if let Some(us_state) = req.state {
            profile.state = Some(us_state);
        }
        Ok(profile.clone())
    }

    async fn settings(&self, token: &str) -> Result<Settings, AppError> {
        let state = self.state();
        let user = auth_user(&state, token)?;
        state.settings.get(&user).cloned().ok_or(AppError::NotFound)
    }

    async fn update_settings(
        &self,
        token: &str,
        patch: SettingsPatch,
    ) -> Result<Settings, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        let settings = state.settings.get_mut(&user).ok_or(AppError::NotFound)?;
        if let Some(v) = patch.email_notifications {
            settings.email_notifications = v;
        }
        if let Some(v) = patch.deadline_reminders {
            settings.deadline_reminders = v;
        }
        if let Some(v) = patch.profile_visible {
            settings.profile_visible = v;
        }
        Ok(settings.clone())
    }

    async fn upload_headshot(
        &self,
        token: &str,
        filename: String,
        _bytes: Vec<u8>,
    ) -> Result<Profile, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        let profile = state.profiles.get_mut(&user).ok_or(AppError::NotFound)?;
        profile.headshot_url = Some(format!("/media/headshots/{}", filename));
        Ok(profile.clone())
    }

    async fn upload_resume(
        &self,
        token: &str,
        filename: String,
        _bytes: Vec<u8>,
    ) -> Result<Profile, AppError> {
        let mut state = self.state();
        let user = auth_user(&state, token)?;
        let profile = state.profiles.get_mut(&user).ok_or(AppError::NotFound)?;
        profile.resume_url = Some(format!("/media/resumes/{}", filename));
        Ok(profile.clone())
    }
}
