//! `EtcdBackup` spec types.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::status::EtcdBackupStatus;

/// `EtcdBackup` requests a one-off etcd backup written to a PVC.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "operator.openshift.io",
    version = "v1alpha1",
    kind = "EtcdBackup",
    status = "EtcdBackupStatus",
    printcolumn = r#"{"name":"PVC","type":"string","jsonPath":".spec.pvcName"}"#,
    printcolumn = r#"{"name":"RETENTION","type":"string","jsonPath":".spec.retentionPolicy.retentionType"}"#,
    printcolumn = r#"{"name":"AGE","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct EtcdBackupSpec {
    /// Name of the PersistentVolumeClaim that receives the backup.
    pub pvc_name: String,

    /// How many backups to keep on the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<RetentionPolicy>,
}

/// Kind of retention applied to stored backups.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum RetentionType {
    RetentionNumber,
    RetentionSize,
}

impl std::fmt::Display for RetentionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RetentionNumber => write!(f, "RetentionNumber"),
            Self::RetentionSize => write!(f, "RetentionSize"),
        }
    }
}

/// Retention policy for backups on the PVC.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    pub retention_type: RetentionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_number: Option<RetentionNumberConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_size: Option<RetentionSizeConfig>,
}

/// Keep at most this many backups.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionNumberConfig {
    pub max_number_of_backups: u32,
}

/// Keep backups up to this total size.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSizeConfig {
    pub max_size_of_backups_gb: u32,
}

impl RetentionPolicy {
    pub const fn by_number(max_number_of_backups: u32) -> Self {
        Self {
            retention_type: RetentionType::RetentionNumber,
            retention_number: Some(RetentionNumberConfig {
                max_number_of_backups,
            }),
            retention_size: None,
        }
    }

    pub const fn by_size(max_size_of_backups_gb: u32) -> Self {
        Self {
            retention_type: RetentionType::RetentionSize,
            retention_number: None,
            retention_size: Some(RetentionSizeConfig {
                max_size_of_backups_gb,
            }),
        }
    }
}
