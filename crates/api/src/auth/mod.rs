//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`cookie`] -- session cookie formatting and parsing.
//! - [`session`] -- the signed-cookie session store.
//! - [`oauth`] -- mapping external identities onto local accounts.

pub mod cookie;
pub mod oauth;
pub mod password;
pub mod session;
