//! Identity provider implementations.

pub mod inmemory;

pub use inmemory::{AccountSeed, InMemoryIdentityProvider};
