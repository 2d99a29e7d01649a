//! Business logic on top of the persistence layer

pub mod services;
pub mod traits;
