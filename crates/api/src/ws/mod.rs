//! WebSocket infrastructure for live notification push.
//!
//! Provides the per-user connection hub, the push payload type, heartbeat
//! monitoring, and the HTTP upgrade handler used by Axum routes.

mod event;
mod handler;
mod heartbeat;
pub mod hub;

pub use event::PushEvent;
pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use hub::{DeliveryReport, Hub};
