//! # PlantPal Common Library
//!
//! Shared code for the PlantPal relay and client including:
//! - The relay wire contract (route, field names, error body)
//! - Configuration file loading
//! - Common error types

pub mod api;
pub mod config;
pub mod error;

pub use error::{error_chain, Error, Result};
