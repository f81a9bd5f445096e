//! # kubectl-reap
//!
//! A kubectl plugin that deletes Kubernetes resources nothing depends on.
//!
//! ## Features
//!
//! - **Reference tracking**: ConfigMaps and Secrets referenced by Pods, ReplicaSet templates or ServiceAccounts are kept
//! - **Volume binding**: PersistentVolumes are kept while any claim could bind them
//! - **Lifecycle checks**: finished Pods and completed Jobs are removed
//! - **Selector evaluation**: PodDisruptionBudgets that select no Pod are removed
//! - **Target lookup**: HorizontalPodAutoscalers whose scale target is gone are removed
//!
//! ## Example
//!
//! ```rust,no_run
//! use kubectl_reap::config::ReapConfig;
//! use kubectl_reap::handlers::{ReapOptions, handle_reap};
//! use kubectl_reap::reaper::ResourceKind;
//!
//! # async fn run() -> kubectl_reap::Result<()> {
//! let options = ReapOptions {
//!     resources: vec![ResourceKind::ConfigMap, ResourceKind::Secret],
//!     namespace: Some("staging".to_string()),
//!     ..Default::default()
//! };
//! let summary = handle_reap(options, &ReapConfig::default()).await?;
//! println!("deleted {}", summary.deleted);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod reaper;

// Re-export commonly used types and functions
pub use error::{ReapError, Result};
pub use reaper::{Candidate, ResourceKind, UsageDeterminer};

/// Current version of the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
