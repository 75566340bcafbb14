//! Terminal front-end over the chat session

pub mod app;
pub mod conversation;
pub mod profile;
pub mod sidebar;
pub mod splash;

pub use app::{run, App};
