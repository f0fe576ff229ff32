use serde::Serialize;

use crate::crd::{BackupPhase, RetentionPolicy};

#[derive(Debug, Serialize)]
pub struct ExecutionSummary {
    pub status: String,
    pub message: String,
    pub total_execution_time_seconds: f64,
    pub step_timings: StepTimings,
    pub etcd_backup: String,
    pub pvc_name: String,
    pub job_name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<RetentionPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<BackupPhase>,
}

#[derive(Debug, Serialize, Default)]
pub struct StepTimings {
    pub job_lookup: f64,
    pub backup_creation: f64,
    pub backup_wait: f64,
}
