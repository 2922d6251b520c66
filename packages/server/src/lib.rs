//! Real-time chat for support tickets.
//!
//! Each ticket with at least one connected participant has a live chat room. Sessions
//! join a room, submit create/update/delete actions on persisted messages, and receive
//! every successful action as an event.

// layers
pub mod domain;
pub mod infrastructure;
pub mod realtime;
pub mod ui;
pub mod usecase;

pub mod config;
