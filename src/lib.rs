//! VoyageMart: a chat-style storefront where shoppers talk to the marketplace
//! assistant or to a merchant's customer service.
//!
//! [`session::ChatSession`] holds the conversation state; [`scheduler`]
//! delivers the canned replies it produces; [`ui`] renders it in a terminal.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod events;
pub mod logging;
pub mod replies;
pub mod scheduler;
pub mod session;
pub mod ui;
