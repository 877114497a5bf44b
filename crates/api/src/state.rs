use std::sync::Arc;

use agora_db::DbPool;

use crate::auth::session::SessionStore;
use crate::config::{ConfigError, ServerConfig};
use crate::middleware::rate_limit::RateLimiter;
use crate::notifications::Notifier;
use crate::ws::Hub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Signed-cookie session store.
    pub sessions: Arc<SessionStore>,
    /// Live WebSocket connections per user.
    pub hub: Arc<Hub>,
    /// Best-effort notification persistence and push.
    pub notifier: Notifier,
    /// Per-address admission control.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire up the shared services from `config`.
    ///
    /// Fails when the session secret cannot key a signer.
    pub fn new(pool: DbPool, config: ServerConfig) -> Result<Self, ConfigError> {
        let sessions = Arc::new(SessionStore::new(pool.clone(), &config.session)?);
        let hub = Arc::new(Hub::new(config.ws_channel_capacity));
        let notifier = Notifier::new(pool.clone(), Arc::clone(&hub));
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));

        Ok(Self {
            pool,
            config: Arc::new(config),
            sessions,
            hub,
            notifier,
            rate_limiter,
        })
    }
}
