//! Infrastructure layer: adapters for the domain ports, transport connections and DTOs.

pub mod connection;
pub mod dto;
pub mod identity;
pub mod repository;
