//! SeaORM entities for the mirror tables
//!
//! Tables:
//! - kubernetes_namespaces: one row per mirrored or locally created namespace
//! - kubernetes_service_accounts: one row per mirrored service account

pub mod namespace;
pub mod service_account;
