use anyhow::{Context, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use std::time::Instant;
use tracing::{info, info_span};

use crate::cli::BackupArgs;
use crate::crd::{BackupPhase, EtcdBackup};
use crate::error::BackupError;
use crate::k8s;
use crate::retention;
use crate::types::StepTimings;

/// Options for a single backup request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupOpts {
    pub pvc_name: String,
    pub retention: String,
    pub job_name: String,
}

/// How the request is submitted and followed up.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub namespace: String,
    pub wait: bool,
    pub timeout: u64,
    pub check_interval: u64,
}

/// Outcome of a submitted backup request.
#[derive(Debug)]
pub struct BackupOutcome {
    pub etcd_backup: EtcdBackup,
    pub phase: Option<BackupPhase>,
}

impl From<&BackupArgs> for BackupOpts {
    fn from(args: &BackupArgs) -> Self {
        Self {
            pvc_name: args.pvc.clone(),
            retention: args.retention.clone(),
            job_name: args.job_name.clone(),
        }
    }
}

impl From<&BackupArgs> for RunSettings {
    fn from(args: &BackupArgs) -> Self {
        Self {
            namespace: args.namespace.clone(),
            wait: args.wait,
            timeout: args.timeout,
            check_interval: args.check_interval,
        }
    }
}

impl BackupOpts {
    /// Check that the required flags were given. Retention is not inspected.
    pub fn validate(&self) -> Result<(), BackupError> {
        if self.pvc_name.is_empty() {
            return Err(BackupError::MissingFlag("pvc"));
        }
        if self.job_name.is_empty() {
            return Err(BackupError::MissingFlag("job-name"));
        }
        Ok(())
    }

    /// Build the `EtcdBackup` object for these options.
    pub fn build(&self, owner: Option<OwnerReference>) -> Result<EtcdBackup, BackupError> {
        let retention_policy = retention::parse(&self.retention)?;
        Ok(k8s::etcdbackup::build_etcd_backup(
            &self.job_name,
            &self.pvc_name,
            retention_policy,
            owner,
        ))
    }

    /// Render the `EtcdBackup` as YAML without contacting the cluster.
    ///
    /// The owner reference needs the live Job's UID, so it is left out.
    pub fn render(&self) -> Result<String> {
        let backup = self.build(None)?;
        serde_yaml::to_string(&backup).context("Failed to serialize EtcdBackup to YAML")
    }

    /// Submit the backup request and optionally wait for it to finish.
    pub async fn run(
        &self,
        client: &kube::Client,
        settings: &RunSettings,
        step_timings: &mut StepTimings,
    ) -> Result<BackupOutcome> {
        // Fail on a bad retention string before touching the cluster
        retention::parse(&self.retention)?;

        // Step 1: Resolve owning Job
        let _span = info_span!("step_1_job_lookup", job_name = %self.job_name).entered();
        info!(namespace = %settings.namespace, "Looking up owning Job");
        let step1_start = Instant::now();
        let job = k8s::job::get_job(client, &settings.namespace, &self.job_name).await?;
        let owner = k8s::job::owner_reference(&job)?;
        step_timings.job_lookup = step1_start.elapsed().as_secs_f64();
        info!(
            duration_seconds = step_timings.job_lookup,
            owner_uid = %owner.uid,
            "Job lookup completed"
        );
        drop(_span);

        // Step 2: Create EtcdBackup
        let _span = info_span!("step_2_backup_creation", job_name = %self.job_name).entered();
        info!(pvc_name = %self.pvc_name, "Creating EtcdBackup");
        let step2_start = Instant::now();
        let backup = self.build(Some(owner))?;
        let created = k8s::etcdbackup::create_etcd_backup(client, &backup).await?;
        step_timings.backup_creation = step2_start.elapsed().as_secs_f64();
        info!(
            duration_seconds = step_timings.backup_creation,
            "EtcdBackup creation completed"
        );
        drop(_span);

        // Step 3: Wait for completion
        let phase = if settings.wait {
            let _span = info_span!("step_3_backup_wait", job_name = %self.job_name).entered();
            let step3_start = Instant::now();
            let phase = k8s::etcdbackup::wait_for_completion(
                client,
                &self.job_name,
                settings.timeout,
                settings.check_interval,
            )
            .await?;
            step_timings.backup_wait = step3_start.elapsed().as_secs_f64();
            info!(
                duration_seconds = step_timings.backup_wait,
                phase = %phase,
                "Backup wait completed"
            );
            drop(_span);
            Some(phase)
        } else {
            info!("Not waiting for backup completion");
            None
        };

        Ok(BackupOutcome {
            etcd_backup: created,
            phase,
        })
    }
}
