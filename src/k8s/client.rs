//! Kubernetes client construction.

use anyhow::Result;
use kube::config::KubeConfigOptions;
use tracing::debug;

use crate::error::BackupError;

/// Build a Kubernetes client.
///
/// With an explicit kubeconfig context only that context is used. Without
/// one the config is inferred: the in-cluster service account when running
/// inside the backup Job, otherwise the current kubeconfig context.
pub async fn build_client(context: Option<&str>) -> Result<kube::Client> {
    let config = match context {
        Some(ctx) => {
            let options = KubeConfigOptions {
                context: Some(ctx.to_string()),
                ..Default::default()
            };
            kube::Config::from_kubeconfig(&options)
                .await
                .map_err(|e| BackupError::Kubeconfig(format!("context '{}': {}", ctx, e)))?
        }
        None => kube::Config::infer()
            .await
            .map_err(|e| BackupError::Kubeconfig(e.to_string()))?,
    };

    debug!(
        cluster_url = %config.cluster_url,
        context = context.unwrap_or("inferred"),
        "Resolved Kubernetes API endpoint"
    );

    kube::Client::try_from(config)
        .map_err(|e| BackupError::Kubeconfig(format!("failed to build client: {}", e)).into())
}
