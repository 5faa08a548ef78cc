//! KubePortal Sync Library
//!
//! Mirrors Kubernetes namespaces and service accounts into the KubePortal database.
//! Tests are included in the module files (e.g., reconciler/mod.rs).
//!
//! ## Quick Start
//!
//! ```rust
//! use kubeportal_sync::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod prelude;
pub mod reconciler;
pub mod server;
pub mod store;
