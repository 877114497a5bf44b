//! Request pipeline middleware and identity extractors.
//!
//! - [`rate_limit`] -- per-address token bucket admission control.
//! - [`session`] -- resolves the session cookie into an [`session::Identity`].
//! - [`auth::AuthUser`] / [`auth::MaybeUser`] -- extract the signed-in user.
//! - [`rbac::RequireAdmin`] -- admin-only gate.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
pub mod session;
