//! HTTP API handlers for plantpal-relay

pub mod identify;

pub use identify::relay_identify;
