pub mod dto;
mod memory;

pub use memory::InMemoryPortalApi;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    Institution, NewApplicationRequest, Profile, ProfileUpdate, Scholarship, Settings,
    SettingsPatch, TrackedApplication, UpdateApplicationRequest, UserAccount,
};
use crate::workflow::{CollegeStatus, ScholarshipStatus};
use dto::{
    DashboardResponse, ErrorBody, LoginRequest, Page, RegisterRequest, SearchParams,
    TokenResponse, flatten_detail,
};

/// Everything the portal backend does for us. The backend is the source of
/// truth; nothing behind this trait holds durable state.
///
/// Authenticated calls take the bearer token explicitly so the session
/// lifecycle stays in one place instead of inside the transport.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn register(&self, req: RegisterRequest) -> Result<UserAccount, AppError>;
    /// Returns the bearer token on success.
    async fn login(&self, req: LoginRequest) -> Result<String, AppError>;
    async fn current_user(&self, token: &str) -> Result<UserAccount, AppError>;

    async fn featured_institutions(&self) -> Result<Vec<Institution>, AppError>;
    async fn search_institutions(&self, params: &SearchParams)
    -> Result<Page<Institution>, AppError>;
    async fn institution(&self, id: Uuid) -> Result<Institution, AppError>;
    async fn institutions_by_state(
        &self,
        code: &str,
        page: u32,
    ) -> Result<Page<Institution>, AppError>;

    async fn scholarships(&self, page: u32) -> Result<Page<Scholarship>, AppError>;
    async fn scholarship(&self, id: Uuid) -> Result<Scholarship, AppError>;

    async fn college_dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<CollegeStatus>>, AppError>;
    async fn track_college(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<CollegeStatus>, AppError>;
    async fn update_college(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<CollegeStatus>,
    ) -> Result<TrackedApplication<CollegeStatus>, AppError>;
    async fn untrack_college(&self, token: &str, id: Uuid) -> Result<(), AppError>;

    async fn scholarship_dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<ScholarshipStatus>>, AppError>;
    async fn track_scholarship(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError>;
    async fn update_scholarship(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<ScholarshipStatus>,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError>;
    async fn untrack_scholarship(&self, token: &str, id: Uuid) -> Result<(), AppError>;

    async fn profile(&self, token: &str) -> Result<Profile, AppError>;
    async fn update_profile(&self, token: &str, req: ProfileUpdate) -> Result<Profile, AppError>;
    async fn settings(&self, token: &str) -> Result<Settings, AppError>;
    async fn update_settings(&self, token: &str, patch: SettingsPatch)
    -> Result<Settings, AppError>;
    async fn upload_headshot(
        &self,
        token: &str,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<Profile, AppError>;
    async fn upload_resume(
        &self,
        token: &str,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<Profile, AppError>;
}

/// Maps a non-success backend response onto the error taxonomy. Duplicate
/// tracking attempts come back as a 400 whose detail says so; they get
/// their own variant so the UI can show "already tracked" instead of a
/// generic failure.
pub fn map_error(status: u16, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);
    match status {
        401 => AppError::Unauthorized,
        404 => AppError::NotFound,
        400 | 409 | 422 => {
            let (message, field_errors) = flatten_detail(detail);
            if message.to_lowercase().contains("already track") {
                AppError::AlreadyTracked(message)
            } else {
                AppError::Validation {
                    message,
                    field_errors,
                }
            }
        }
        _ => {
            let (message, _) = flatten_detail(detail);
            AppError::Backend { status, message }
        }
    }
}

pub struct HttpPortalApi {
    client: Client,
    base_url: String,
}

impl HttpPortalApi {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &body));
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("failed to parse backend response: {}", e);
            AppError::Backend {
                status: status.as_u16(),
                message: format!("Unreadable response: {}", e),
            }
        })
    }

    async fn execute_no_body(&self, request: RequestBuilder) -> Result<(), AppError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, AppError> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = Self::bearer(request, token);
        }
        self.execute(request).await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, AppError> {
        let mut request = self.client.request(method, self.url(path)).json(body);
        if let Some(token) = token {
            request = Self::bearer(request, token);
        }
        self.execute(request).await
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<T, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = Self::bearer(self.client.post(self.url(path)), token).multipart(form);
        self.execute(request).await
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn register(&self, req: RegisterRequest) -> Result<UserAccount, AppError> {
        self.send_json(reqwest::Method::POST, "/auth/register", None, &req)
            .await
    }

    async fn login(&self, req: LoginRequest) -> Result<String, AppError> {
        let response: TokenResponse = self
            .send_json(reqwest::Method::POST, "/auth/login-json", None, &req)
            .await?;
        Ok(response.access_token)
    }

    async fn current_user(&self, token: &str) -> Result<UserAccount, AppError> {
        self.get_json("/auth/me", Some(token)).await
    }

    async fn featured_institutions(&self) -> Result<Vec<Institution>, AppError> {
        self.get_json("/institutions/featured", None).await
    }

    async fn search_institutions(
        &self,
        params: &SearchParams,
    ) -> Result<Page<Institution>, AppError> {
        let request = self
            .client
            .get(self.url("/institutions/search"))
            .query(&params.as_query());
        self.execute(request).await
    }

    async fn institution(&self, id: Uuid) -> Result<Institution, AppError> {
        self.get_json(&format!("/institutions/{}", id), None).await
    }

    async fn institutions_by_state(
        &self,
        code: &str,
        page: u32,
    ) -> Result<Page<Institution>, AppError> {
        let request = self
            .client
            .get(self.url(&format!("/institutions/by-state/{}", code)))
            .query(&[("page", page)]);
        self.execute(request).await
    }

    async fn scholarships(&self, page: u32) -> Result<Page<Scholarship>, AppError> {
        let request = self
            .client
            .get(self.url("/scholarships/"))
            .query(&[("page", page)]);
        self.execute(request).await
    }

    async fn scholarship(&self, id: Uuid) -> Result<Scholarship, AppError> {
        self.get_json(&format!("/scholarships/{}", id), None).await
    }

    async fn college_dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<CollegeStatus>>, AppError> {
        let response: DashboardResponse<CollegeStatus> = self
            .get_json("/college-tracking/dashboard", Some(token))
            .await?;
        Ok(response.applications)
    }

    async fn track_college(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<CollegeStatus>, AppError> {
        self.send_json(
            reqwest::Method::POST,
            "/college-tracking/applications",
            Some(token),
            &req,
        )
        .await
    }

    async fn update_college(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<CollegeStatus>,
    ) -> Result<TrackedApplication<CollegeStatus>, AppError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/college-tracking/applications/{}", id),
            Some(token),
            &req,
        )
        .await
    }

    async fn untrack_college(&self, token: &str, id: Uuid) -> Result<(), AppError> {
        let request = Self::bearer(
            self.client
                .delete(self.url(&format!("/college-tracking/applications/{}", id))),
            token,
        );
        self.execute_no_body(request).await
    }

    async fn scholarship_dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<ScholarshipStatus>>, AppError> {
        let response: DashboardResponse<ScholarshipStatus> = self
            .get_json("/scholarship-tracking/dashboard", Some(token))
            .await?;
        Ok(response.applications)
    }

    async fn track_scholarship(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        self.send_json(
            reqwest::Method::POST,
            "/scholarship-tracking/applications",
            Some(token),
            &req,
        )
        .await
    }

    async fn update_scholarship(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<ScholarshipStatus>,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/scholarship-tracking/applications/{}", id),
            Some(token),
            &req,
        )
        .await
    }

    async fn untrack_scholarship(&self, token: &str, id: Uuid) -> Result<(), AppError> {
        let request = Self::bearer(
            self.client
                .delete(self.url(&format!("/scholarship-tracking/applications/{}", id))),
            token,
        );
        self.execute_no_body(request).await
    }

    async fn profile(&self, token: &str) -> Result<Profile, AppError> {
        self.get_json("/profiles/me", Some(token)).await
    }

    async fn update_profile(&self, token: &str, req: ProfileUpdate) -> Result<Profile, AppError> {
        self.send_json(reqwest::Method::PUT, "/profiles/me", Some(token), &req)
            .await
    }

    async fn settings(&self, token: &str) -> Result<Settings, AppError> {
        self.get_json("/profiles/me/settings", Some(token)).await
    }

    async fn update_settings(
        &self,
        token: &str,
        patch: SettingsPatch,
    ) -> Result<Settings, AppError> {
        self.send_json(
            reqwest::Method::PATCH,
            "/profiles/me/settings",
            Some(token),
            &patch,
        )
        .await
    }

    async fn upload_headshot(
        &self,
        token: &str,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<Profile, AppError> {
        self.upload("/profiles/me/upload-headshot", token, filename, bytes)
            .await
    }

    async fn upload_resume(
        &self,
        token: &str,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<Profile, AppError> {
        self.upload(
            "/profiles/me/upload-resume-and-update",
            token,
            filename,
            bytes,
        )
        .await
    }
}
