use std::sync::Arc;

use tracing::info;

use crate::api::PortalApi;
use crate::api::dto::{LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::UserAccount;
use crate::session::{Session, SessionStore};

/// Owns the session lifecycle: signing in stores the token, signing out or
/// hitting a 401 clears it. Every other service borrows the token from
/// here.
pub struct AccountService {
    api: Arc<dyn PortalApi>,
    store: SessionStore,
    session: Session,
}

impl AccountService {
    pub fn new(api: Arc<dyn PortalApi>, store: SessionStore) -> Result<Self, AppError> {
        let session = store.load()?;
        Ok(Self {
            api,
            store,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn require_token(&self) -> Result<&str, AppError> {
        self.session.token().ok_or(AppError::Unauthorized)
    }

    pub async fn register(
        &self,
        email: String,
        password: String,
        full_name: Option<String>,
    ) -> Result<UserAccount, AppError> {
        let account = self
            .api
            .register(RegisterRequest {
                email,
                password,
                full_name,
            })
            .await?;
        info!("registered account {}", account.email);
        Ok(account)
    }

    pub async fn login(&mut self, email: String, password: String) -> Result<(), AppError> {
        let token = self.api.login(LoginRequest { email, password }).await?;
        self.session.sign_in(token);
        self.store.save(&self.session)?;
        info!("signed in");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.session.sign_out();
        self.store.clear()?;
        info!("signed out");
        Ok(())
    }

    pub async fn current_user(&mut self) -> Result<UserAccount, AppError> {
        let token = self.require_token()?.to_string();
        match self.api.current_user(&token).await {
            Ok(user) => Ok(user),
            Err(e) => Err(self.absorb(e)),
        }
    }

    /// Funnel for errors from any authenticated call: a 401 means the
    /// stored token is dead, so the session is cleared before the error
    /// continues up to the UI.
    pub fn absorb(&mut self, error: AppError) -> AppError {
        if error.is_unauthorized() && self.session.is_signed_in() {
            self.session.sign_out();
            if let Err(e) = self.store.clear() {
                tracing::warn!("failed to clear session file: {}", e);
            }
        }
        error
    }
}
