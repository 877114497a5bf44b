//! Signed-cookie session store.
//!
//! The client holds `session_id=<signed token>`; the database holds the raw
//! identifier, its owner and its expiry. Every user owns at most one session
//! row: creating a session replaces the previous one in a single transaction.

use agora_core::retry::RetryPolicy;
use agora_core::signature::{SessionSigner, SignatureError};
use agora_core::types::{DbId, Timestamp};
use agora_db::models::session::Session;
use agora_db::repositories::SessionRepo;
use agora_db::DbPool;
use axum::http::HeaderMap;
use chrono::Utc;

use crate::auth::cookie::{self, SESSION_COOKIE};
use crate::config::SessionConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no session cookie")]
    MissingCookie,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session does not exist")]
    InvalidSession,

    #[error("session has expired")]
    Expired,

    #[error("session store stayed locked after {attempts} attempts")]
    Contention { attempts: u32 },

    #[error("session store error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SessionError {
    /// Outcomes that mean "no identity" rather than a server fault.
    pub fn is_guest(&self) -> bool {
        matches!(
            self,
            SessionError::MissingCookie
                | SessionError::InvalidSignature
                | SessionError::InvalidSession
                | SessionError::Expired
        )
    }
}

/// A freshly created session and the cookie that carries it.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: Session,
    /// `Set-Cookie` header value.
    pub cookie: String,
}

/// A session that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSession {
    pub session_id: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
}

impl ValidSession {
    /// Whether less than `threshold` remains at `now`.
    pub fn needs_refresh(&self, now: Timestamp, threshold: chrono::Duration) -> bool {
        self.expires_at - now < threshold
    }
}

pub struct SessionStore {
    pool: DbPool,
    signer: SessionSigner,
    ttl: chrono::Duration,
    refresh_threshold: chrono::Duration,
    secure_cookies: bool,
    retry: RetryPolicy,
}

impl SessionStore {
    pub fn new(pool: DbPool, config: &SessionConfig) -> Result<Self, SignatureError> {
        Ok(Self {
            pool,
            signer: SessionSigner::new(&config.secret)?,
            ttl: config.ttl,
            refresh_threshold: config.refresh_threshold,
            secure_cookies: config.secure_cookies,
            retry: RetryPolicy::session_create(),
        })
    }

    /// Override the contention retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn refresh_threshold(&self) -> chrono::Duration {
        self.refresh_threshold
    }

    /// Create a session for `user_id`, replacing any previous one.
    ///
    /// Lock contention is retried according to the store's [`RetryPolicy`];
    /// any other database error is returned immediately.
    pub async fn create(&self, user_id: DbId) -> Result<IssuedSession, SessionError> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay_before(attempt)).await;
            }

            let now = Utc::now();
            match SessionRepo::replace_for_user(&self.pool, &id, user_id, now, now + self.ttl).await
            {
                Ok(session) => {
                    tracing::info!(user_id, attempt, "Session created");
                    let cookie = self.cookie_for(&session.id, session.expires_at);
                    return Ok(IssuedSession { session, cookie });
                }
                Err(e) if agora_db::is_lock_contention(&e) => {
                    if !self.retry.should_retry(attempt) {
                        tracing::error!(user_id, attempts = attempt + 1, "Session store stayed locked");
                        return Err(SessionError::Contention {
                            attempts: attempt + 1,
                        });
                    }
                    tracing::warn!(user_id, attempt, error = %e, "Session store locked, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolve the session carried by the request's cookie.
    ///
    /// The signature is checked before storage is consulted. An expired row
    /// is deleted on the way out.
    pub async fn validate(&self, headers: &HeaderMap) -> Result<ValidSession, SessionError> {
        let token =
            cookie::read_cookie(headers, SESSION_COOKIE).ok_or(SessionError::MissingCookie)?;
        let raw_id = self
            .signer
            .verify(token)
            .ok_or(SessionError::InvalidSignature)?;

        let session = SessionRepo::find_by_id(&self.pool, &raw_id)
            .await?
            .ok_or(SessionError::InvalidSession)?;

        if session.is_expired_at(Utc::now()) {
            if let Err(e) = SessionRepo::delete(&self.pool, &session.id).await {
                tracing::warn!(user_id = session.user_id, error = %e, "Failed to delete expired session");
            }
            return Err(SessionError::Expired);
        }

        Ok(ValidSession {
            session_id: session.id,
            user_id: session.user_id,
            expires_at: session.expires_at,
        })
    }

    /// Push the expiry of `session_id` out to a full lifetime from now.
    ///
    /// Returns the `Set-Cookie` value carrying the new expiry.
    pub async fn refresh(&self, session_id: &str) -> Result<String, SessionError> {
        let expires_at = Utc::now() + self.ttl;
        if !SessionRepo::extend(&self.pool, session_id, expires_at).await? {
            return Err(SessionError::InvalidSession);
        }
        tracing::debug!("Session refreshed");
        Ok(self.cookie_for(session_id, expires_at))
    }

    /// Delete the session named by the request's cookie.
    ///
    /// Returns `true` if a row was removed. A missing or forged cookie is
    /// not an error; there is simply nothing to delete.
    pub async fn destroy(&self, headers: &HeaderMap) -> Result<bool, SessionError> {
        let Some(raw_id) = cookie::read_cookie(headers, SESSION_COOKIE)
            .and_then(|token| self.signer.verify(token))
        else {
            return Ok(false);
        };

        let removed = SessionRepo::delete(&self.pool, &raw_id).await?;
        if removed {
            tracing::info!("Session destroyed");
        }
        Ok(removed)
    }

    /// `Set-Cookie` value that clears the client's session cookie.
    pub fn clearing_cookie(&self) -> String {
        cookie::clearing_cookie(self.secure_cookies)
    }

    fn cookie_for(&self, session_id: &str, expires_at: Timestamp) -> String {
        cookie::session_cookie(&self.signer.sign(session_id), expires_at, self.secure_cookies)
    }

    /// Signed token for a raw session identifier, as carried in the cookie.
    pub fn sign(&self, session_id: &str) -> String {
        self.signer.sign(session_id)
    }
}
