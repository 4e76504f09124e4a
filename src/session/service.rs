use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    generators::{PetNameUsernameGenerator, UsernameGenerator},
    models::SessionModel,
    repository::SessionRepository,
    token::TokenConfig,
    types::{ResolvedSession, SessionClaims, SessionResponse},
};
use crate::shared::AppError;

/// Issues, validates and revokes caller sessions
///
/// Handlers never look at ambient request state: the caller's token is
/// read from the request and handed to [`SessionService::resolve_session`]
/// or [`SessionService::current_session`] explicitly.
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    token_config: TokenConfig,
    username_generator: Arc<dyn UsernameGenerator>,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self::with_username_generator(
            repository,
            token_config,
            Arc::new(PetNameUsernameGenerator::new()),
        )
    }

    pub fn with_username_generator(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        token_config: TokenConfig,
        username_generator: Arc<dyn UsernameGenerator>,
    ) -> Self {
        Self {
            repository,
            token_config,
            username_generator,
        }
    }

    /// Creates and stores a new session, returning its signed token
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> Result<SessionResponse, AppError> {
        let username = self.username_generator.generate().await;
        let session = SessionModel::new(username, self.token_config.expiration_days);

        self.repository.create_session(&session).await?;
        let token = self
            .token_config
            .create_token(&session.id, &session.username)?;

        info!(session_id = %session.id, username = %session.username, "Session created");

        Ok(SessionResponse {
            token,
            session_id: session.id,
            username: session.username,
        })
    }

    /// Validates a session token and returns the claims if valid
    ///
    /// The token must carry a good signature and the session it names
    /// must still be stored and unexpired.
    #[instrument(skip(self, token))]
    pub async fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.get_session(&claims.session_id).await? {
            Some(session) if session.is_expired() => {
                warn!(session_id = %claims.session_id, "Session has expired");
                Err(AppError::Unauthorized("Session has expired".to_string()))
            }
            Some(_) => Ok(claims),
            None => {
                warn!(session_id = %claims.session_id, "Session not found - may have been revoked");
                Err(AppError::Unauthorized(
                    "Session not found or has been revoked".to_string(),
                ))
            }
        }
    }

    /// Whether `token` names a live session. Storage failures propagate.
    pub async fn exists(&self, token: &str) -> Result<bool, AppError> {
        match self.validate_session(token).await {
            Ok(_) => Ok(true),
            Err(AppError::JwtError(_)) | Err(AppError::Unauthorized(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Returns the claims for a presented token, or `None` when there is no
    /// token or it no longer names a live session
    #[instrument(skip(self, token))]
    pub async fn current_session(
        &self,
        token: Option<&str>,
    ) -> Result<Option<SessionClaims>, AppError> {
        let Some(token) = token else {
            return Ok(None);
        };

        match self.validate_session(token).await {
            Ok(claims) => Ok(Some(claims)),
            Err(AppError::JwtError(_)) | Err(AppError::Unauthorized(_)) => {
                debug!("Presented token does not name a live session");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Reuses the caller's session when the presented token is live,
    /// otherwise issues a fresh one
    #[instrument(skip(self, token))]
    pub async fn resolve_session(&self, token: Option<&str>) -> Result<ResolvedSession, AppError> {
        if let (Some(token), Some(claims)) = (token, self.current_session(token).await?) {
            self.repository
                .touch_session(&claims.session_id, Utc::now())
                .await?;

            return Ok(ResolvedSession {
                token: token.to_string(),
                session_id: claims.session_id,
                username: claims.username,
                created: false,
            });
        }

        let session = self.create_session().await?;
        Ok(ResolvedSession {
            token: session.token,
            session_id: session.session_id,
            username: session.username,
            created: true,
        })
    }

    /// Revokes a session by removing it from storage
    #[instrument(skip(self))]
    pub async fn revoke_session(&self, session_id: &str) -> Result<(), AppError> {
        self.repository.delete_session(session_id).await?;
        info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let removed_count = self.repository.delete_expired_sessions(Utc::now()).await?;
        info!(removed_sessions = removed_count, "Expired sessions cleanup completed");
        Ok(removed_count)
    }
}
