//! Filesystem service.
//!
//! Unique responsibility: lifecycle operations for shared filesystems.
//!
//! Endpoints:
//! - GET    `{base}/filesystems?metadata.filterType=ComputeGeneral`
//! - POST   `{base}/filesystems`
//! - GET    `{base}/filesystems/id/{resourceId}`
//! - PUT    `{base}/filesystems/name/{name}`
//! - DELETE `{base}/filesystems/id/{resourceId}`
//!
//! Creation is asynchronous on the backend: the POST returns with a
//! transient phase and the engine polls until `FSReady` / `FSFailed`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CloudClient;
use crate::errors::CloudError;
use crate::phase::{ResourceHandle, ResourceKind};
use crate::reconciler::{ObservedPhase, ReconcileConfig, wait_for_ready};
use crate::timeouts;

/// List envelope for filesystems.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesystemList {
    /// Filesystems owned by the account.
    #[serde(default)]
    pub items: Vec<Filesystem>,
}

/// A filesystem as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filesystem {
    /// Identity and ownership.
    #[serde(default)]
    pub metadata: FilesystemMetadata,
    /// Requested configuration.
    #[serde(default)]
    pub spec: FilesystemSpec,
    /// Observed state.
    #[serde(default)]
    pub status: FilesystemStatus,
}

/// Filesystem identity block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesystemMetadata {
    /// Backend-assigned resource id.
    #[serde(rename = "resourceId", default)]
    pub resource_id: String,
    /// Owning cloud account.
    #[serde(rename = "cloudAccountId", default)]
    pub cloudaccount: String,
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation timestamp.
    #[serde(rename = "creationTimestamp", default)]
    pub created_at: String,
}

/// Requested filesystem configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesystemSpec {
    /// Requested capacity.
    #[serde(default)]
    pub request: StorageCapacity,
    /// Storage class.
    #[serde(rename = "storageClass", default)]
    pub storage_class: String,
    /// Access mode.
    #[serde(rename = "accessModes", default)]
    pub access_mode: String,
    /// Filesystem type.
    #[serde(rename = "filesystemType", default)]
    pub filesystem_type: String,
    /// Whether the filesystem is encrypted at rest.
    #[serde(rename = "Encrypted", default)]
    pub encrypted: bool,
    /// Availability zone hosting the filesystem.
    #[serde(rename = "availabilityZone", default)]
    pub availability_zone: String,
}

/// Capacity request, e.g. `{"storage": "2TB"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageCapacity {
    /// Requested size string.
    #[serde(rename = "storage", default)]
    pub size: String,
}

/// Observed filesystem state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesystemStatus {
    /// Backend-reported phase (`FSProvisioning`, `FSReady`, ...).
    #[serde(default)]
    pub phase: String,
    /// Mount access details, populated once ready.
    #[serde(default)]
    pub mount: FilesystemMount,
}

/// Mount access details for a ready filesystem.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesystemMount {
    /// Cluster address to mount from.
    #[serde(rename = "clusterAddr", default)]
    pub cluster_addr: String,
    /// Cluster software version.
    #[serde(rename = "clusterVersion", default)]
    pub cluster_version: String,
    /// Namespace within the cluster.
    #[serde(default)]
    pub namespace: String,
    /// Mount username.
    #[serde(default)]
    pub username: String,
    /// Mount password.
    #[serde(default)]
    pub password: String,
    /// Exported filesystem name.
    #[serde(rename = "filesystemName", default)]
    pub filesystem_name: String,
}

impl ObservedPhase for Filesystem {
    fn phase(&self) -> &str {
        &self.status.phase
    }
}

/// Request body for filesystem creation.
#[derive(Debug, Clone, Serialize)]
pub struct FilesystemCreateRequest {
    /// Identity of the new filesystem.
    pub metadata: CreateMetadata,
    /// Requested configuration.
    pub spec: FilesystemCreateSpec,
}

/// Name-only metadata for create requests.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMetadata {
    /// Caller-chosen resource name.
    pub name: String,
}

/// Spec block for filesystem creation.
#[derive(Debug, Clone, Serialize)]
pub struct FilesystemCreateSpec {
    /// Requested capacity.
    pub request: StorageCapacity,
    /// Storage class.
    #[serde(rename = "storageClass")]
    pub storage_class: String,
    /// Access mode.
    #[serde(rename = "accessModes")]
    pub access_mode: String,
    /// Filesystem type.
    #[serde(rename = "filesystemType")]
    pub filesystem_type: String,
    /// Backing instance type.
    #[serde(rename = "instanceType")]
    pub instance_type: String,
    /// Whether to encrypt at rest.
    #[serde(rename = "Encrypted")]
    pub encrypted: bool,
    /// Availability zone to create in.
    #[serde(rename = "availabilityZone")]
    pub availability_zone: String,
}

#[derive(Debug, Serialize)]
struct FilesystemUpdatePayload {
    spec: FilesystemUpdateSpec,
}

#[derive(Debug, Serialize)]
struct FilesystemUpdateSpec {
    request: StorageCapacity,
}

impl CloudClient {
    /// List the account's filesystems.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn list_filesystems(&self) -> Result<Vec<Filesystem>, CloudError> {
        let url = format!(
            "{}/filesystems?metadata.filterType=ComputeGeneral",
            self.api_base()
        );
        let list: FilesystemList = self.get_json(&url).await?;
        Ok(list.items)
    }

    /// Create a filesystem and wait until it is ready.
    ///
    /// Submits the create, then polls the read endpoint until the
    /// backend reports `FSReady`, within the resolved time budget.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if the backend
    /// reports `FSFailed`, [`CloudError::Timeout`] if the budget
    /// elapses, or any classified API error.
    pub async fn create_filesystem(
        &self,
        request: &FilesystemCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<Filesystem, CloudError> {
        let budget = timeouts::resolve(ResourceKind::Filesystem, timeout_override)?;
        let url = format!("{}/filesystems", self.api_base());
        let created: Filesystem = self.post_json(&url, request).await?;

        let handle = ResourceHandle::new(ResourceKind::Filesystem, created.metadata.resource_id);
        debug!(%handle, "filesystem create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_filesystem(handle.id())).await
    }

    /// Fetch a filesystem by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_filesystem(&self, resource_id: &str) -> Result<Filesystem, CloudError> {
        let url = format!("{}/filesystems/id/{resource_id}", self.api_base());
        self.get_json(&url).await
    }

    /// Resize a filesystem by name.
    ///
    /// The backend applies the resize in place; no reconciliation is
    /// required.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn update_filesystem_size(&self, name: &str, size: &str) -> Result<(), CloudError> {
        let url = format!("{}/filesystems/name/{name}", self.api_base());
        let payload = FilesystemUpdatePayload {
            spec: FilesystemUpdateSpec {
                request: StorageCapacity {
                    size: size.to_string(),
                },
            },
        };
        self.put_json(&url, &payload).await
    }

    /// Delete a filesystem by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_filesystem(&self, resource_id: &str) -> Result<(), CloudError> {
        let url = format!("{}/filesystems/id/{resource_id}", self.api_base());
        self.delete_resource(&url).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn response_decodes_wire_names() {
        let body = serde_json::json!({
            "metadata": {
                "resourceId": "fs-1",
                "cloudAccountId": "acct-1",
                "name": "scratch",
                "creationTimestamp": "2025-11-02T10:00:00Z"
            },
            "spec": {
                "request": { "storage": "2TB" },
                "storageClass": "GeneralPurpose",
                "accessModes": "ReadWrite",
                "filesystemType": "ComputeGeneral",
                "Encrypted": true,
                "availabilityZone": "us-region-1a"
            },
            "status": {
                "phase": "FSProvisioning",
                "mount": { "clusterAddr": "10.0.0.1", "username": "u" }
            }
        })
        .to_string();

        let fs: Filesystem = serde_json::from_str(&body).unwrap();
        assert_eq!(fs.metadata.resource_id, "fs-1");
        assert_eq!(fs.spec.request.size, "2TB");
        assert!(fs.spec.encrypted);
        assert_eq!(fs.phase(), "FSProvisioning");
        assert_eq!(fs.status.mount.cluster_addr, "10.0.0.1");
    }

    #[test]
    fn missing_status_defaults_to_pending_phase() {
        let fs: Filesystem = serde_json::from_str(r#"{"metadata":{"resourceId":"fs-2"}}"#).unwrap();
        assert_eq!(fs.phase(), "");
        assert_eq!(
            ResourceKind::Filesystem.classify(fs.phase()),
            crate::phase::PollOutcome::Pending
        );
    }

    #[test]
    fn create_request_serializes_wire_names() {
        let req = FilesystemCreateRequest {
            metadata: CreateMetadata {
                name: "scratch".to_string(),
            },
            spec: FilesystemCreateSpec {
                request: StorageCapacity {
                    size: "1TB".to_string(),
                },
                storage_class: "GeneralPurpose".to_string(),
                access_mode: "ReadWrite".to_string(),
                filesystem_type: "ComputeGeneral".to_string(),
                instance_type: "storage-general".to_string(),
                encrypted: true,
                availability_zone: "us-region-1a".to_string(),
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["metadata"]["name"], "scratch");
        assert_eq!(value["spec"]["request"]["storage"], "1TB");
        assert_eq!(value["spec"]["storageClass"], "GeneralPurpose");
        assert_eq!(value["spec"]["Encrypted"], true);
    }
}
