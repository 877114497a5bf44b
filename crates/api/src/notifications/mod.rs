//! Notification side effects of user actions.
//!
//! [`Notifier`] stores a notification and pushes it to the recipient's live
//! connections. Its failures are reported through [`NotifyOutcome`] and
//! logged, never through the caller's error path.

mod service;

pub use service::{NotifyError, NotifyOutcome, Notifier};
