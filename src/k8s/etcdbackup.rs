//! `EtcdBackup` creation and completion polling.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Api;
use kube::api::PostParams;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::crd::{BackupPhase, EtcdBackup, EtcdBackupSpec, RetentionPolicy};
use crate::error::BackupError;

pub const FIELD_MANAGER: &str = "etcd-backup-cr";
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const JOB_NAME_LABEL: &str = "etcd-backup-cr/job-name";

/// Build the `EtcdBackup` object for a backup request.
///
/// The object is named after the owning Job so that each Job run maps to
/// exactly one backup request.
pub fn build_etcd_backup(
    job_name: &str,
    pvc_name: &str,
    retention_policy: Option<RetentionPolicy>,
    owner: Option<OwnerReference>,
) -> EtcdBackup {
    let mut backup = EtcdBackup::new(
        job_name,
        EtcdBackupSpec {
            pvc_name: pvc_name.to_string(),
            retention_policy,
        },
    );

    backup.metadata.labels = Some(BTreeMap::from([
        (MANAGED_BY_LABEL.to_string(), FIELD_MANAGER.to_string()),
        (JOB_NAME_LABEL.to_string(), job_name.to_string()),
    ]));
    backup.metadata.owner_references = owner.map(|o| vec![o]);

    backup
}

/// Submit an `EtcdBackup`.
///
/// On `409 AlreadyExists` the existing object is fetched and returned
/// unchanged, so a retried Job does not request a second backup.
pub async fn create_etcd_backup(client: &kube::Client, backup: &EtcdBackup) -> Result<EtcdBackup> {
    let api: Api<EtcdBackup> = Api::all(client.clone());
    let name = backup.metadata.name.as_deref().unwrap_or_default();

    let pp = PostParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    };

    match api.create(&pp, backup).await {
        Ok(created) => {
            info!(
                etcd_backup = %name,
                pvc_name = %created.spec.pvc_name,
                "EtcdBackup created"
            );
            Ok(created)
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            let existing = api.get(name).await.map_err(|e| {
                BackupError::KubernetesApi(format!(
                    "Failed to get existing EtcdBackup '{}': {}",
                    name, e
                ))
            })?;
            warn!(
                etcd_backup = %name,
                pvc_name = %existing.spec.pvc_name,
                "EtcdBackup already exists, reusing it"
            );
            Ok(existing)
        }
        Err(e) => Err(BackupError::KubernetesApi(format!(
            "Failed to create EtcdBackup '{}': {}",
            name, e
        ))
        .into()),
    }
}

/// Poll an `EtcdBackup` until it reaches a terminal phase.
///
/// The status is always read at least once before the deadline is checked.
/// `Skipped` counts as success and is only logged. `Failed` is an error.
pub async fn wait_for_completion(
    client: &kube::Client,
    name: &str,
    max_wait_time: u64,
    check_interval: u64,
) -> Result<BackupPhase> {
    let api: Api<EtcdBackup> = Api::all(client.clone());
    let wait_start_time = Instant::now();
    let mut checks_performed = 0u32;

    info!(
        etcd_backup = %name,
        max_wait_time_seconds = max_wait_time,
        check_interval_seconds = check_interval,
        "Waiting for backup completion"
    );

    loop {
        let backup = api.get(name).await.map_err(|e| {
            BackupError::KubernetesApi(format!("Failed to get EtcdBackup '{}': {}", name, e))
        })?;
        let status = backup.status.unwrap_or_default();
        let phase = status.phase();
        checks_performed += 1;
        let elapsed_time = wait_start_time.elapsed().as_secs_f64();

        debug!(
            check_number = checks_performed,
            phase = %phase,
            elapsed_seconds = elapsed_time,
            "Backup status check"
        );

        match phase {
            BackupPhase::Completed => {
                info!(
                    checks_performed,
                    duration_seconds = elapsed_time,
                    backup_job = status.backup_job.as_ref().map(|j| j.name.as_str()).unwrap_or(""),
                    "Backup completed successfully"
                );
                return Ok(phase);
            }
            BackupPhase::Skipped => {
                warn!(
                    checks_performed,
                    reason = status.message().unwrap_or("unknown"),
                    "Backup was skipped by the operator"
                );
                return Ok(phase);
            }
            BackupPhase::Failed => {
                return Err(BackupError::BackupFailed(format!(
                    "{} after {} checks",
                    status.message().unwrap_or("no message"),
                    checks_performed
                ))
                .into());
            }
            BackupPhase::Pending => {}
        }

        if wait_start_time.elapsed().as_secs() >= max_wait_time {
            return Err(BackupError::Timeout(format!(
                "EtcdBackup '{}' did not finish after {:.1}s",
                name,
                wait_start_time.elapsed().as_secs_f64()
            ))
            .into());
        }

        if checks_performed % 10 == 0 {
            info!(
                check_number = checks_performed,
                elapsed_seconds = elapsed_time,
                "Long-running backup detected"
            );
        }

        tokio::time::sleep(Duration::from_secs(check_interval)).await;
    }
}
