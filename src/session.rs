//! Explicit session lifecycle: the bearer token moves through sign-in and
//! sign-out transitions instead of being poked into storage from call
//! sites. The token is the only durable client state.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    SignedOut,
    SignedIn {
        token: String,
    },
}

impl Session {
    pub fn sign_in(&mut self, token: String) {
        *self = Session::SignedIn { token };
    }

    pub fn sign_out(&mut self) {
        *self = Session::SignedOut;
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::SignedIn { token } => Some(token),
            Session::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Session::SignedIn { .. })
    }
}

/// Persists the session token to a file between invocations.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// A missing or empty file is simply a signed-out session.
    pub fn load(&self) -> Result<Session, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(Session::SignedOut)
                } else {
                    Ok(Session::SignedIn {
                        token: token.to_string(),
                    })
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Session::SignedOut),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), AppError> {
        match session.token() {
            Some(token) => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, token)?;
                debug!("session saved to {}", self.path.display());
                Ok(())
            }
            None => self.clear(),
        }
    }

    pub fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
