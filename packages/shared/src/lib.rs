//! Utilities shared across Parley packages.

pub mod logger;
pub mod time;
