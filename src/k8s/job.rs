//! Lookup of the batch Job that owns a backup request.

use anyhow::Result;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Api, Resource, ResourceExt};
use tracing::debug;

use crate::error::BackupError;

/// Fetch a Job by name.
pub async fn get_job(client: &kube::Client, namespace: &str, name: &str) -> Result<Job> {
    let api: Api<Job> = Api::namespaced(client.clone(), namespace);
    let job = api.get_opt(name).await.map_err(|e| {
        BackupError::KubernetesApi(format!("Failed to get Job {}/{}: {}", namespace, name, e))
    })?;

    let job = job.ok_or_else(|| BackupError::JobNotFound {
        namespace: namespace.to_string(),
        name: name.to_string(),
    })?;

    let uid = job.uid().unwrap_or_default();
    debug!(
        namespace = %namespace,
        job_name = %name,
        uid = %uid,
        active = job.status.as_ref().and_then(|s| s.active).unwrap_or(0),
        "Found owning Job"
    );

    Ok(job)
}

/// Build a plain owner reference pointing at the Job.
///
/// `controller` and `blockOwnerDeletion` stay unset: setting
/// `blockOwnerDeletion` needs update rights on `jobs/finalizers` under
/// OwnerReferencesPermissionEnforcement.
pub fn owner_reference(job: &Job) -> Result<OwnerReference, BackupError> {
    let uid = job.uid().ok_or_else(|| {
        BackupError::KubernetesApi(format!(
            "Job '{}' has no UID, cannot use it as owner",
            job.name_any()
        ))
    })?;

    Ok(OwnerReference {
        api_version: Job::api_version(&()).to_string(),
        kind: Job::kind(&()).to_string(),
        name: job.name_any(),
        uid,
        ..Default::default()
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::k8s::mock;
    use http::Method;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    pub(crate) fn test_job(name: &str, uid: Option<&str>) -> Job {
        Job {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("openshift-etcd".to_string()),
                uid: uid.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_reference_points_at_job() {
        let job = test_job("backup-28391040", Some("1234-abcd"));
        let owner = owner_reference(&job).unwrap();
        assert_eq!(owner.api_version, "batch/v1");
        assert_eq!(owner.kind, "Job");
        assert_eq!(owner.name, "backup-28391040");
        assert_eq!(owner.uid, "1234-abcd");
    }

    #[test]
    fn test_owner_reference_leaves_controller_flags_unset() {
        let owner = owner_reference(&test_job("backup-1", Some("uid-1"))).unwrap();
        assert_eq!(owner.controller, None);
        assert_eq!(owner.block_owner_deletion, None);

        let json = serde_json::to_value(&owner).unwrap();
        assert!(json.get("controller").is_none());
        assert!(json.get("blockOwnerDeletion").is_none());
    }

    #[test]
    fn test_owner_reference_requires_uid() {
        let job = test_job("backup-1", None);
        let err = owner_reference(&job).unwrap_err();
        assert!(err.to_string().contains("has no UID"));
    }

    #[tokio::test]
    async fn test_get_job_found() {
        let client = mock::client(|method, path| {
            assert_eq!(*method, Method::GET);
            assert_eq!(path, "/apis/batch/v1/namespaces/openshift-etcd/jobs/backup-1");
            let job = test_job("backup-1", Some("uid-1"));
            (200, serde_json::to_value(&job).unwrap())
        });

        let job = get_job(&client, "openshift-etcd", "backup-1").await.unwrap();
        assert_eq!(job.uid().as_deref(), Some("uid-1"));
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let client = mock::client(|_, _| {
            (
                404,
                mock::status_error(404, "NotFound", "jobs.batch \"backup-1\" not found"),
            )
        });

        let err = get_job(&client, "openshift-etcd", "backup-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackupError>(),
            Some(BackupError::JobNotFound { namespace, name })
                if namespace == "openshift-etcd" && name == "backup-1"
        ));
    }

    #[tokio::test]
    async fn test_get_job_api_error() {
        let client = mock::client(|_, _| {
            (
                403,
                mock::status_error(403, "Forbidden", "jobs.batch is forbidden"),
            )
        });

        let err = get_job(&client, "openshift-etcd", "backup-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackupError>(),
            Some(BackupError::KubernetesApi(_))
        ));
    }
}
