//! Rental marketplace web service - Library exports for testing
//!
//! (c) Softlandia 2025

pub mod api;
pub mod core;
pub mod error;
pub mod infrastructure;
