use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use agora_core::signature::SignatureError;

/// Longest session lifetime accepted from the environment: one year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Error raised when the environment does not describe a runnable server.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Server configuration loaded from environment variables.
///
/// Everything except the session secret has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite database URL (default: `sqlite://agora.db`).
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight work during shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub session: SessionConfig,
    /// Outbound buffer per live connection before it counts as a slow consumer.
    pub ws_channel_capacity: usize,
    pub rate_limit: RateLimitConfig,
}

/// Session cookie and lifetime settings.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC key for signing session tokens.
    pub secret: String,
    pub ttl: chrono::Duration,
    /// Sessions with less than this left are extended on use.
    pub refresh_threshold: chrono::Duration,
    /// Mark the cookie `Secure`. On when `APP_ENV=production`.
    pub secure_cookies: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("refresh_threshold", &self.refresh_threshold)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Token bucket parameters for per-address admission control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Bucket capacity.
    pub burst: u32,
    /// Time to earn back one token.
    pub refill_every: Duration,
    /// Visitors unseen for longer than this are forgotten.
    pub idle_timeout: Duration,
    /// How often idle visitors are swept.
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 10,
            refill_every: Duration::from_millis(50),
            idle_timeout: Duration::from_secs(180),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `DATABASE_URL`                   | `sqlite://agora.db`     |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                    |
    /// | `SESSION_HMAC_SECRET`            | required                |
    /// | `APP_ENV`                        | `development`           |
    /// | `SESSION_TTL_HOURS`              | `24`                    |
    /// | `SESSION_REFRESH_THRESHOLD_MINS` | `60`                    |
    /// | `WS_CHANNEL_CAPACITY`            | `32`                    |
    /// | `RATE_LIMIT_BURST`               | `10`                    |
    /// | `RATE_LIMIT_REFILL_MS`           | `50`                    |
    /// | `RATE_LIMIT_IDLE_SECS`           | `180`                   |
    /// | `RATE_LIMIT_SWEEP_SECS`          | `60`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup("SESSION_HMAC_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("SESSION_HMAC_SECRET"))?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let secure_cookies = lookup("APP_ENV").is_some_and(|env| env == "production");

        let ttl_hours: i64 = parse_var(&lookup, "SESSION_TTL_HOURS", 24)?;
        let refresh_mins: i64 = parse_var(&lookup, "SESSION_REFRESH_THRESHOLD_MINS", 60)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_HOURS",
                value: ttl_hours.to_string(),
            });
        }
        // Refreshing must begin before the session runs out.
        if refresh_mins < 0 || refresh_mins >= ttl_hours * 60 {
            return Err(ConfigError::Invalid {
                name: "SESSION_REFRESH_THRESHOLD_MINS",
                value: refresh_mins.to_string(),
            });
        }

        let ws_channel_capacity: usize = parse_var(&lookup, "WS_CHANNEL_CAPACITY", 32)?;
        if ws_channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "WS_CHANNEL_CAPACITY",
                value: "0".into(),
            });
        }

        let burst: u32 = parse_var(&lookup, "RATE_LIMIT_BURST", 10)?;
        if burst == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_BURST",
                value: "0".into(),
            });
        }
        let refill_ms: u64 = parse_var(&lookup, "RATE_LIMIT_REFILL_MS", 50)?;
        if refill_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_REFILL_MS",
                value: "0".into(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_var(&lookup, "PORT", 3000)?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://agora.db".into()),
            cors_origins,
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse_var(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30)?,
            session: SessionConfig {
                secret,
                ttl: chrono::Duration::hours(ttl_hours),
                refresh_threshold: chrono::Duration::minutes(refresh_mins),
                secure_cookies,
            },
            ws_channel_capacity,
            rate_limit: RateLimitConfig {
                burst,
                refill_every: Duration::from_millis(refill_ms),
                idle_timeout: Duration::from_secs(parse_var(&lookup, "RATE_LIMIT_IDLE_SECS", 180)?),
                sweep_interval: Duration::from_secs(parse_var(
                    &lookup,
                    "RATE_LIMIT_SWEEP_SECS",
                    60,
                )?),
            },
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
