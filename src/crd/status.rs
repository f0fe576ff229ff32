//! `EtcdBackup` status types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CONDITION_COMPLETED: &str = "BackupCompleted";
pub const CONDITION_FAILED: &str = "BackupFailed";
pub const CONDITION_SKIPPED: &str = "BackupSkipped";

/// Observed state of an `EtcdBackup`, written by the etcd operator.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EtcdBackupStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<BackupCondition>,

    /// Job the operator started to take the backup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_job: Option<BackupJobReference>,
}

/// Reference to the Job running the backup.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupJobReference {
    pub namespace: String,
    pub name: String,
}

/// Condition on an `EtcdBackup`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

/// Summarized progress of a backup request.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupPhase {
    Pending,
    Completed,
    Failed,
    Skipped,
}

impl std::fmt::Display for BackupPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Skipped => write!(f, "Skipped"),
        }
    }
}

impl EtcdBackupStatus {
    /// Derive the phase from conditions.
    ///
    /// The most recent terminal condition with status `True` wins.
    /// Without one the backup is still `Pending`.
    pub fn phase(&self) -> BackupPhase {
        self.terminal_condition()
            .map(|(phase, _)| phase)
            .unwrap_or(BackupPhase::Pending)
    }

    /// Message of the condition that decided the current phase, if any.
    pub fn message(&self) -> Option<&str> {
        self.terminal_condition()
            .and_then(|(_, c)| c.message.as_deref().or(c.reason.as_deref()))
    }

    fn terminal_condition(&self) -> Option<(BackupPhase, &BackupCondition)> {
        self.conditions
            .iter()
            .filter(|c| c.status == "True")
            .filter_map(|c| {
                let phase = match c.type_.as_str() {
                    CONDITION_COMPLETED => BackupPhase::Completed,
                    CONDITION_FAILED => BackupPhase::Failed,
                    CONDITION_SKIPPED => BackupPhase::Skipped,
                    _ => return None,
                };
                Some((phase, c))
            })
            .max_by_key(|(_, c)| c.last_transition_time)
    }
}
