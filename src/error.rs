//! Custom error types for etcd-backup-cr.

use thiserror::Error;

/// Errors that can occur while requesting an etcd backup.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("missing required flag: --{0}")]
    MissingFlag(&'static str),

    #[error("Invalid retention policy: {0}")]
    InvalidRetention(String),

    #[error("Job {namespace}/{name} not found")]
    JobNotFound { namespace: String, name: String },

    #[error("Kubernetes API error: {0}")]
    KubernetesApi(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Backup failed: {0}")]
    BackupFailed(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),
}
