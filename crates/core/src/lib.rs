//! Domain core for the Agora forum.
//!
//! Everything here is pure: no I/O, no clocks beyond what callers pass in.
//! The `db` and `api` crates build on these types.

pub mod error;
pub mod notification;
pub mod permissions;
pub mod promotion;
pub mod retry;
pub mod roles;
pub mod signature;
pub mod types;
