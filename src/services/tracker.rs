use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::api::PortalApi;
use crate::dashboard::{self, Dashboard};
use crate::error::AppError;
use crate::models::{
    ApplicationType, NewApplicationRequest, TrackedApplication, UpdateApplicationRequest,
};
use crate::workflow::{self, ScholarshipStatus, Stage};

/// The tracking endpoints for one entity type. College and scholarship
/// tracking expose the same four operations under different paths; this
/// trait lets one service drive both instead of two hand-copied ones.
#[async_trait]
pub trait TrackingApi<S: Stage>: Send + Sync {
    async fn dashboard(&self, token: &str) -> Result<Vec<TrackedApplication<S>>, AppError>;
    async fn create(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<S>, AppError>;
    async fn update(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<S>,
    ) -> Result<TrackedApplication<S>, AppError>;
    async fn delete(&self, token: &str, id: Uuid) -> Result<(), AppError>;
}

pub struct CollegeTracking(pub Arc<dyn PortalApi>);

#[async_trait]
impl TrackingApi<workflow::CollegeStatus> for CollegeTracking {
    async fn dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<workflow::CollegeStatus>>, AppError> {
        self.0.college_dashboard(token).await
    }

    async fn create(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<workflow::CollegeStatus>, AppError> {
        self.0.track_college(token, req).await
    }

    async fn update(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<workflow::CollegeStatus>,
    ) -> Result<TrackedApplication<workflow::CollegeStatus>, AppError> {
        self.0.update_college(token, id, req).await
    }

    async fn delete(&self, token: &str, id: Uuid) -> Result<(), AppError> {
        self.0.untrack_college(token, id).await
    }
}

pub struct ScholarshipTracking(pub Arc<dyn PortalApi>);

#[async_trait]
impl TrackingApi<ScholarshipStatus> for ScholarshipTracking {
    async fn dashboard(
        &self,
        token: &str,
    ) -> Result<Vec<TrackedApplication<ScholarshipStatus>>, AppError> {
        self.0.scholarship_dashboard(token).await
    }

    async fn create(
        &self,
        token: &str,
        req: NewApplicationRequest,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        self.0.track_scholarship(token, req).await
    }

    async fn update(
        &self,
        token: &str,
        id: Uuid,
        req: UpdateApplicationRequest<ScholarshipStatus>,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        self.0.update_scholarship(token, id, req).await
    }

    async fn delete(&self, token: &str, id: Uuid) -> Result<(), AppError> {
        self.0.untrack_scholarship(token, id).await
    }
}

/// The application list together with the derived views computed from it.
#[derive(Debug, Clone)]
pub struct TrackerView<S: Stage> {
    pub applications: Vec<TrackedApplication<S>>,
    pub dashboard: Dashboard<S>,
}

impl TrackerView<ScholarshipStatus> {
    pub fn total_potential_value(&self) -> f64 {
        dashboard::total_potential_value(&self.applications)
    }
}

/// Drives the tracking workflow for one entity type: local transition
/// checks before any network call, and a full dashboard refetch after
/// every mutation so the view always reflects the backend's snapshot.
pub struct Tracker<S: Stage> {
    api: Box<dyn TrackingApi<S>>,
}

impl<S: Stage> Tracker<S> {
    pub fn new(api: Box<dyn TrackingApi<S>>) -> Self {
        Self { api }
    }

    fn view(applications: Vec<TrackedApplication<S>>) -> TrackerView<S> {
        let dashboard = dashboard::build_dashboard(&applications, Utc::now());
        TrackerView {
            applications,
            dashboard,
        }
    }

    pub async fn overview(&self, token: &str) -> Result<TrackerView<S>, AppError> {
        let applications = self.api.dashboard(token).await?;
        Ok(Self::view(applications))
    }

    pub async fn track(
        &self,
        token: &str,
        subject_id: Uuid,
        application_type: Option<ApplicationType>,
        notes: Option<String>,
    ) -> Result<TrackedApplication<S>, AppError> {
        let created = self
            .api
            .create(
                token,
                NewApplicationRequest {
                    subject_id,
                    application_type,
                    notes,
                },
            )
            .await?;
        info!("now tracking {}", created.subject_name);
        Ok(created)
    }

    pub async fn find(&self, token: &str, id: Uuid) -> Result<TrackedApplication<S>, AppError> {
        let applications = self.api.dashboard(token).await?;
        applications
            .into_iter()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)
    }

    /// Moves an application to `requested` if the workflow table allows it
    /// from its current status, then refetches the dashboard.
    pub async fn advance(
        &self,
        token: &str,
        id: Uuid,
        requested: S,
    ) -> Result<TrackerView<S>, AppError> {
        let current = self.find(token, id).await?;
        workflow::validate_transition(current.status, requested)?;
        self.api
            .update(token, id, UpdateApplicationRequest::status(requested))
            .await?;
        info!(
            "{} moved from {} to {}",
            current.subject_name,
            current.status.label(),
            requested.label()
        );
        self.overview(token).await
    }

    pub async fn set_notes(
        &self,
        token: &str,
        id: Uuid,
        text: String,
    ) -> Result<TrackedApplication<S>, AppError> {
        self.api
            .update(token, id, UpdateApplicationRequest::notes(text))
            .await
    }

    /// Hard delete. Callers confirm with the user before invoking this.
    pub async fn untrack(&self, token: &str, id: Uuid) -> Result<TrackerView<S>, AppError> {
        self.api.delete(token, id).await?;
        info!("stopped tracking application {}", id);
        self.overview(token).await
    }
}

impl Tracker<ScholarshipStatus> {
    /// Records the awarded amount. Only meaningful once the scholarship
    /// has actually been accepted.
    pub async fn record_award(
        &self,
        token: &str,
        id: Uuid,
        amount: f64,
    ) -> Result<TrackedApplication<ScholarshipStatus>, AppError> {
        let current = self.find(token, id).await?;
        if current.status != ScholarshipStatus::Accepted {
            return Err(AppError::Validation {
                message: "An award amount can only be recorded for an accepted scholarship"
                    .to_string(),
                field_errors: Vec::new(),
            });
        }
        self.api
            .update(
                token,
                id,
                UpdateApplicationRequest {
                    award_amount: Some(amount),
                    ..UpdateApplicationRequest::default()
                },
            )
            .await
    }
}
