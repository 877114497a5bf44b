pub mod comment;
pub mod moderator_request;
pub mod notification;
pub mod post;
pub mod session;
pub mod user;
