//! # Controller Configuration
//!
//! Service-level settings loaded from environment variables.

use crate::reconciler::ReconcileOptions;
use std::time::Duration;

/// Service-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Database connection string for the mirror store
    /// When unset, records are kept in memory and lost on restart
    pub database_url: Option<String>,
    /// Kubeconfig context to load; `None` uses the current context or in-cluster config
    pub kube_context: Option<String>,
    /// Upper bound for each Kubernetes API round trip (seconds)
    pub cluster_request_timeout_secs: u64,
    /// Delete service account records whose uid the cluster no longer reports
    pub prune_service_accounts: bool,
    /// Run one sync as soon as the server is up
    pub sync_on_startup: bool,
    /// HTTP port for `/sync`, `/metrics` and the probes
    pub metrics_port: u16,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            database_url: None,
            kube_context: None,
            cluster_request_timeout_secs: DEFAULT_CLUSTER_REQUEST_TIMEOUT_SECS,
            prune_service_accounts: DEFAULT_PRUNE_SERVICE_ACCOUNTS,
            sync_on_startup: false,
            metrics_port: DEFAULT_METRICS_PORT,
            log_level: "INFO".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            database_url: env_var_optional("DATABASE_URL"),
            kube_context: env_var_optional("KUBE_CONTEXT"),
            cluster_request_timeout_secs: env_var_or_default_nonzero(
                "CLUSTER_REQUEST_TIMEOUT_SECS",
                DEFAULT_CLUSTER_REQUEST_TIMEOUT_SECS,
            ),
            prune_service_accounts: env_var_or_default_bool(
                "PRUNE_SERVICE_ACCOUNTS",
                DEFAULT_PRUNE_SERVICE_ACCOUNTS,
            ),
            sync_on_startup: env_var_or_default_bool("SYNC_ON_STARTUP", false),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "json"),
        }
    }

    /// Get cluster request timeout duration. Zero would fail every call, so it
    /// falls back to the default.
    pub fn cluster_request_timeout(&self) -> Duration {
        let secs = if self.cluster_request_timeout_secs == 0 {
            crate::constants::DEFAULT_CLUSTER_REQUEST_TIMEOUT_SECS
        } else {
            self.cluster_request_timeout_secs
        };
        Duration::from_secs(secs)
    }

    /// Reconciler behaviour derived from this configuration
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            prune_service_accounts: self.prune_service_accounts,
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Like [`env_var_or_default`], but zero counts as unset
fn env_var_or_default_nonzero(key: &str, default: u64) -> u64 {
    match env_var_or_default(key, default) {
        0 => {
            tracing::warn!("{} must be greater than zero, using {}", key, default);
            default
        }
        value => value,
    }
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| parse_bool(&v))
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read environment variable, treating empty values as unset
fn env_var_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_bool(value: &str) -> bool {
    let v_lower = value.trim().to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert!(config.database_url.is_none());
        assert!(!config.prune_service_accounts);
        assert_eq!(config.metrics_port, 5000);
        assert_eq!(config.cluster_request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        for value in ["true", "TRUE", "1", "yes", "on", " On "] {
            assert!(parse_bool(value), "{value:?} should parse as true");
        }
        for value in ["false", "0", "no", "off", "", "maybe"] {
            assert!(!parse_bool(value), "{value:?} should parse as false");
        }
    }

    #[test]
    fn test_reconcile_options_follow_prune_flag() {
        let config = ControllerConfig {
            prune_service_accounts: true,
            ..ControllerConfig::default()
        };
        assert!(config.reconcile_options().prune_service_accounts);
    }

    #[test]
    fn test_env_var_or_default_falls_back_on_garbage() {
        // Unique key so parallel tests don't collide
        std::env::set_var("KUBEPORTAL_SYNC_TEST_TIMEOUT", "not-a-number");
        assert_eq!(env_var_or_default("KUBEPORTAL_SYNC_TEST_TIMEOUT", 7u64), 7);
        std::env::set_var("KUBEPORTAL_SYNC_TEST_TIMEOUT", "12");
        assert_eq!(env_var_or_default("KUBEPORTAL_SYNC_TEST_TIMEOUT", 7u64), 12);
        std::env::remove_var("KUBEPORTAL_SYNC_TEST_TIMEOUT");
    }

    #[test]
    fn test_zero_cluster_timeout_falls_back_to_default() {
        std::env::set_var("KUBEPORTAL_SYNC_TEST_ZERO_TIMEOUT", "0");
        assert_eq!(env_var_or_default_nonzero("KUBEPORTAL_SYNC_TEST_ZERO_TIMEOUT", 30), 30);
        std::env::remove_var("KUBEPORTAL_SYNC_TEST_ZERO_TIMEOUT");

        let config = ControllerConfig {
            cluster_request_timeout_secs: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(config.cluster_request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_var_optional_ignores_blank() {
        std::env::set_var("KUBEPORTAL_SYNC_TEST_BLANK", "   ");
        assert!(env_var_optional("KUBEPORTAL_SYNC_TEST_BLANK").is_none());
        std::env::remove_var("KUBEPORTAL_SYNC_TEST_BLANK");
    }
}
