use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::Stage;

/// Admission round for college applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    EarlyDecision,
    EarlyAction,
    RegularDecision,
    Rolling,
}

impl ApplicationType {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationType::EarlyDecision => "Early Decision",
            ApplicationType::EarlyAction => "Early Action",
            ApplicationType::RegularDecision => "Regular Decision",
            ApplicationType::Rolling => "Rolling",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "early_decision" => Some(ApplicationType::EarlyDecision),
            "early_action" => Some(ApplicationType::EarlyAction),
            "regular_decision" => Some(ApplicationType::RegularDecision),
            "rolling" => Some(ApplicationType::Rolling),
            _ => None,
        }
    }
}

/// One user's record of intent and progress toward a single subject
/// (institution or scholarship). The backend owns the record; this struct
/// is the read model the dashboard endpoints return.
///
/// `deadline` and the scholarship amount fields are inherited from the
/// subject at read time; the application record does not own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "S: Stage")]
pub struct TrackedApplication<S: Stage> {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub status: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// College applications only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_type: Option<ApplicationType>,
    /// Scholarship applications only; set once the award is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_amount: Option<f64>,
    /// Scholarship applications only, mirrored from the subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_exact: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_max: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<S: Stage> TrackedApplication<S> {
    /// The amount this application can still be worth: the exact award if
    /// the subject publishes one, otherwise the published maximum.
    pub fn potential_amount(&self) -> Option<f64> {
        self.amount_exact.or(self.amount_max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplicationRequest {
    pub subject_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_type: Option<ApplicationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "S: Stage")]
pub struct UpdateApplicationRequest<S: Stage> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<S>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_amount: Option<f64>,
}

impl<S: Stage> Default for UpdateApplicationRequest<S> {
    fn default() -> Self {
        Self {
            status: None,
            notes: None,
            award_amount: None,
        }
    }
}

impl<S: Stage> UpdateApplicationRequest<S> {
    pub fn status(status: S) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }
}
