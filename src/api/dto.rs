use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::models::TrackedApplication;
use crate::workflow::Stage;

/// Envelope for paginated list reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.per_page) < self.total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub state: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            state: None,
            page: 1,
            per_page: 20,
        }
    }

    pub fn as_query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("query", self.query.clone()),
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(state) = &self.state {
            q.push(("state", state.clone()));
        }
        q
    }
}

/// Body of the tracking dashboard reads. The backend returns the raw
/// application list; all derived views are computed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "S: Stage")]
pub struct DashboardResponse<S: Stage> {
    pub applications: Vec<TrackedApplication<S>>,
}

/// Error body shape shared by every backend failure response. `detail` is
/// either a plain message or a list of per-field validation items.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ValidationItem {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

/// Reduces a `detail` payload to a banner message plus any per-field
/// breakdown the backend supplied.
pub fn flatten_detail(detail: Option<serde_json::Value>) -> (String, Vec<FieldError>) {
    match detail {
        Some(serde_json::Value::String(message)) => (message, Vec::new()),
        Some(serde_json::Value::Array(items)) => {
            let field_errors: Vec<FieldError> = items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<ValidationItem>(item).ok())
                .map(|item| FieldError {
                    field: item
                        .loc
                        .last()
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_else(|| "request".to_string()),
                    message: item.msg,
                })
                .collect();
            let message = if field_errors.is_empty() {
                "The request was rejected".to_string()
            } else {
                field_errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            (message, field_errors)
        }
        _ => ("The request was rejected".to_string(), Vec::new()),
    }
}
