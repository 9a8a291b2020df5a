use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub acceptance_rate: Option<f64>,
    #[serde(default)]
    pub tuition_in_state: Option<f64>,
    #[serde(default)]
    pub tuition_out_of_state: Option<f64>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub featured: bool,
}
