//! # Configuration
//!
//! Environment-driven configuration for the sync service and CLI.

mod controller;

pub use controller::ControllerConfig;
