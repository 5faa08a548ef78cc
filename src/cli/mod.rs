//! # KPCTL CLI
//!
//! Command-line interface for KubePortal Sync.
//!
//! ## Usage
//!
//! ```bash
//! # Trigger a sync on a running kubeportal-sync server
//! kpctl sync --url http://kubeportal-sync:5000
//!
//! # Run one sync locally against the current kubeconfig context
//! kpctl run --database-url postgresql://portal@localhost/kubeportal
//!
//! # Show mirrored records
//! kpctl list namespaces --database-url sqlite://portal.db
//! kpctl list sa --database-url sqlite://portal.db
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use kubeportal_sync::config::ControllerConfig;
use kubeportal_sync::constants::DEFAULT_SYNC_SERVER_URL;
use kubeportal_sync::observability::logging;
use kubeportal_sync::reconciler::{LogLevel, SyncReport};

mod list;
mod run;
mod sync;

/// KubePortal Sync CLI
#[derive(Parser)]
#[command(name = "kpctl")]
#[command(
    about = "KubePortal Sync CLI",
    long_about = None,
    after_help = "\
Examples:
  kpctl sync --url http://localhost:5000
  kpctl run --context kind-dev --prune-service-accounts
  kpctl list namespaces --database-url sqlite://portal.db
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger a synchronization on a running server and print its log
    Sync {
        /// Base URL of the kubeportal-sync server
        #[arg(long, default_value = DEFAULT_SYNC_SERVER_URL)]
        url: String,
    },
    /// Run one synchronization in this process
    Run {
        /// Kubeconfig context to use (defaults to KUBE_CONTEXT, then the current context)
        #[arg(short, long)]
        context: Option<String>,

        /// Mirror database (defaults to DATABASE_URL; in-memory when neither is set)
        #[arg(long)]
        database_url: Option<String>,

        /// Also remove service account records the cluster no longer lists
        #[arg(long)]
        prune_service_accounts: bool,
    },
    /// List mirrored records
    List {
        #[arg(value_enum, value_name = "RESOURCE_TYPE")]
        resource_type: ResourceType,

        /// Mirror database (defaults to DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
}

/// Record types kpctl can list
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResourceType {
    #[value(name = "namespaces", alias = "ns")]
    Namespaces,
    #[value(name = "serviceaccounts", alias = "sa")]
    ServiceAccounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS connection is made
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| panic!("Failed to install rustls crypto provider"));

    let mut config = ControllerConfig::from_env();
    // Human-readable output unless explicitly asked for json
    if std::env::var("LOG_FORMAT").is_err() {
        config.log_format = "text".to_string();
    }
    logging::init_tracing(&config);

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { url } => sync::sync_command(&url).await,
        Commands::Run {
            context,
            database_url,
            prune_service_accounts,
        } => {
            if context.is_some() {
                config.kube_context = context;
            }
            if database_url.is_some() {
                config.database_url = database_url;
            }
            config.prune_service_accounts |= prune_service_accounts;
            run::run_command(&config).await
        }
        Commands::List {
            resource_type,
            database_url,
        } => {
            let url = database_url.or(config.database_url).ok_or_else(|| {
                anyhow::anyhow!(
                    "A database is required.\n\n\
                    Pass --database-url or set DATABASE_URL.\n\n\
                    Example: kpctl list namespaces --database-url sqlite://portal.db"
                )
            })?;
            list::list_command(&url, resource_type).await
        }
    }
}

/// Print the report log and turn a failed run into an error exit
fn print_report(report: &SyncReport) -> Result<()> {
    for entry in &report.entries {
        match entry.level {
            LogLevel::Info => println!("{}", entry.message),
            LogLevel::Error => println!("ERROR: {}", entry.message),
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Synchronization failed during {:?}",
            report.failed_phase.unwrap_or(report.phase)
        ))
    }
}
