//! Mapping external identity-provider profiles onto local accounts.
//!
//! The provider exchange itself (redirects, code-for-token, profile fetch)
//! happens elsewhere; this module only decides which local user a verified
//! profile belongs to.

use agora_core::roles::Role;
use agora_db::models::user::{CreateUser, User};
use agora_db::repositories::UserRepo;
use agora_db::DbPool;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Message returned to banned users on any sign-in path.
pub const BANNED_MESSAGE: &str = "Your account has been blocked";

/// Upper bound on numeric suffixes tried when a username is taken.
const MAX_USERNAME_SUFFIX: u32 = 1000;

/// A verified profile from an external identity provider.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    /// Provider name such as `github` or `google`.
    pub provider: String,
    /// The provider's stable subject identifier.
    pub provider_id: String,
    pub email: String,
    pub display_name: String,
}

/// Find or create the local account for `profile`.
///
/// Lookup order: an account already bound to the provider identity, then an
/// account with the same email (which gets bound), then a new `user` account
/// with a unique username and an unusable password.
pub async fn resolve_identity(pool: &DbPool, profile: &OAuthProfile) -> AppResult<User> {
    let email = profile.email.trim();
    if email.is_empty() {
        return Err(AppError::validation("Provider did not supply an email"));
    }

    if let Some(user) =
        UserRepo::find_by_provider(pool, &profile.provider, &profile.provider_id).await?
    {
        return ensure_not_banned(user);
    }

    if let Some(user) = UserRepo::find_by_email(pool, email).await? {
        let user = ensure_not_banned(user)?;
        let linked = UserRepo::link_provider(pool, user.id, &profile.provider, &profile.provider_id)
            .await?
            .unwrap_or(user);
        tracing::info!(user_id = linked.id, provider = %profile.provider, "Linked provider identity");
        return Ok(linked);
    }

    let username = unique_username(pool, &profile.display_name, email).await?;
    let password_hash = hash_password(&random_secret())
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username,
            email: email.to_string(),
            password_hash,
            role: Role::User,
            provider: Some(profile.provider.clone()),
            provider_id: Some(profile.provider_id.clone()),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, provider = %profile.provider, "Created account from provider identity");
    Ok(user)
}

fn ensure_not_banned(user: User) -> AppResult<User> {
    if user.banned {
        return Err(AppError::forbidden(BANNED_MESSAGE));
    }
    Ok(user)
}

/// Derive a free username from the display name, falling back to the
/// email's local part.
async fn unique_username(pool: &DbPool, display_name: &str, email: &str) -> AppResult<String> {
    let mut base: String = display_name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    if base.is_empty() {
        base = email.split('@').next().unwrap_or_default().to_string();
    }
    if base.is_empty() {
        base = "user".to_string();
    }

    if !UserRepo::username_exists(pool, &base).await? {
        return Ok(base);
    }
    for suffix in 1..=MAX_USERNAME_SUFFIX {
        let candidate = format!("{base}{suffix}");
        if !UserRepo::username_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::InternalError(format!(
        "No free username derived from {base:?}"
    )))
}

/// A random string nobody knows, used as the password of provider-only
/// accounts.
fn random_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}
