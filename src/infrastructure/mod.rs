//! Persistence layer: connection handling, entities and repositories

pub mod database;
pub mod entities;
pub mod repositories;
pub mod traits;
