use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scholarship as served by the backend directory. Award amounts are
/// either exact or an upper bound; an absent amount stays absent and is
/// never read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: Uuid,
    pub name: String,
    pub organization: String,
    pub description: String,
    #[serde(default)]
    pub amount_exact: Option<f64>,
    #[serde(default)]
    pub amount_max: Option<f64>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub website: Option<String>,
}
