use std::env;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the portal backend, without a trailing slash.
    pub api_url: String,
    /// Where the bearer token is persisted between invocations.
    pub session_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let api_url = env::var("CAMPUSTRACK_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_url = api_url.trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(AppError::Config(
                "CAMPUSTRACK_API_URL must not be empty".to_string(),
            ));
        }

        let session_file = env::var("CAMPUSTRACK_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        Ok(Self {
            api_url,
            session_file,
        })
    }
}

fn default_session_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".campustrack-session"),
        Err(_) => PathBuf::from(".campustrack-session"),
    }
}
