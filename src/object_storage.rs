//! Object storage service.
//!
//! Unique responsibility: lifecycle operations for object storage
//! buckets and the principals that access them.
//!
//! Endpoints:
//! - POST   `{base}/objects/buckets`
//! - GET    `{base}/objects/buckets/id/{resourceId}`
//! - DELETE `{base}/objects/buckets/id/{resourceId}`
//! - POST   `{base}/objects/users`
//! - GET    `{base}/objects/users/id/{userId}`
//! - DELETE `{base}/objects/users/id/{userId}`
//!
//! Bucket and user creation are asynchronous; the engine polls until
//! `BucketReady` / `ObjectUserReady` (or their failed counterparts).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CloudClient;
use crate::errors::CloudError;
use crate::phase::{ResourceHandle, ResourceKind};
use crate::reconciler::{ObservedPhase, ReconcileConfig, wait_for_ready};
use crate::timeouts;

/// An object storage bucket as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectBucket {
    /// Identity and ownership.
    #[serde(default)]
    pub metadata: ObjectBucketMetadata,
    /// Requested configuration.
    #[serde(default)]
    pub spec: ObjectBucketSpec,
    /// Observed state.
    #[serde(default)]
    pub status: ObjectBucketStatus,
}

impl ObservedPhase for ObjectBucket {
    fn phase(&self) -> &str {
        &self.status.phase
    }
}

/// Bucket identity block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectBucketMetadata {
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Backend-assigned resource id.
    #[serde(rename = "resourceId", default)]
    pub resource_id: String,
    /// Owning cloud account.
    #[serde(rename = "cloudAccountId", default)]
    pub cloudaccount: String,
}

/// Requested bucket configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectBucketSpec {
    /// Whether object versioning is enabled.
    #[serde(default)]
    pub versioned: bool,
    /// Backing instance type.
    #[serde(rename = "instanceType", default)]
    pub instance_type: String,
    /// Provisioned capacity.
    #[serde(default)]
    pub request: BucketCapacity,
}

/// Provisioned bucket capacity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketCapacity {
    /// Capacity size string.
    #[serde(default)]
    pub size: String,
}

/// Observed bucket state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectBucketStatus {
    /// Backend-reported phase (`BucketProvisioning`, `BucketReady`, ...).
    #[serde(default)]
    pub phase: String,
    /// Backing cluster access details.
    #[serde(default)]
    pub cluster: BucketCluster,
    /// Network access policy.
    #[serde(rename = "securityGroup", default)]
    pub security_group: BucketSecurityGroup,
}

/// Backing cluster access details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketCluster {
    /// S3-compatible access endpoint.
    #[serde(rename = "accessEndpoint", default)]
    pub access_endpoint: String,
    /// Backing cluster id.
    #[serde(rename = "clusterId", default)]
    pub cluster_id: String,
}

/// Network access policy for a bucket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketSecurityGroup {
    /// Subnets allowed to reach the bucket.
    #[serde(rename = "networkFilterAllow", default)]
    pub network_filter_allow: Vec<BucketNetworkFilter>,
}

/// One allowed subnet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketNetworkFilter {
    /// Gateway address.
    #[serde(default)]
    pub gateway: String,
    /// Subnet prefix length.
    #[serde(rename = "prefixLength", default)]
    pub prefix_length: i64,
    /// Subnet address.
    #[serde(default)]
    pub subnet: String,
}

/// Request body for bucket creation.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectBucketCreateRequest {
    /// Identity of the new bucket.
    pub metadata: CreateMetadata,
    /// Requested configuration.
    pub spec: ObjectBucketCreateSpec,
}

/// Name-only metadata for create requests.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMetadata {
    /// Caller-chosen resource name.
    pub name: String,
}

/// Spec block for bucket creation.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectBucketCreateSpec {
    /// Whether to enable object versioning.
    pub versioned: bool,
    /// Backing instance type.
    #[serde(rename = "instanceType")]
    pub instance_type: String,
}

/// An object storage access principal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectUser {
    /// Identity and ownership.
    #[serde(default)]
    pub metadata: ObjectUserMetadata,
    /// Bucket access policies granted to the user.
    #[serde(default)]
    pub spec: Vec<BucketPolicy>,
    /// Observed state.
    #[serde(default)]
    pub status: ObjectUserStatus,
}

impl ObservedPhase for ObjectUser {
    fn phase(&self) -> &str {
        &self.status.phase
    }
}

/// Object user identity block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectUserMetadata {
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Backend-assigned user id.
    #[serde(rename = "userId", default)]
    pub user_id: String,
    /// Owning cloud account.
    #[serde(rename = "cloudAccountId", default)]
    pub cloudaccount: String,
}

/// Access policy binding a user to a bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketPolicy {
    /// Target bucket id.
    #[serde(rename = "bucketId", default)]
    pub bucket_id: String,
    /// Allowed actions.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Allowed permissions.
    #[serde(rename = "permission", default)]
    pub permissions: Vec<String>,
    /// Object key prefix the policy applies to.
    #[serde(default)]
    pub prefix: String,
}

/// Observed object user state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectUserStatus {
    /// Backend-reported phase (`ObjectUserReady`, ...).
    #[serde(default)]
    pub phase: String,
    /// Issued principal.
    #[serde(default)]
    pub principal: ObjectUserPrincipal,
}

/// Issued principal with credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectUserPrincipal {
    /// Access credentials.
    #[serde(default)]
    pub credentials: ObjectUserCredentials,
}

/// S3-compatible access credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectUserCredentials {
    /// Access key.
    #[serde(rename = "accessKey", default)]
    pub access_key: String,
    /// Secret key.
    #[serde(rename = "secretKey", default)]
    pub secret_key: String,
}

/// Request body for object user creation.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectUserCreateRequest {
    /// Identity of the new user.
    pub metadata: CreateMetadata,
    /// Bucket access policies to grant.
    pub spec: Vec<BucketPolicy>,
}

impl CloudClient {
    /// Create a bucket and wait until it is ready.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if the backend
    /// reports `BucketFailed`, [`CloudError::Timeout`] if the budget
    /// elapses, or any classified API error.
    pub async fn create_object_bucket(
        &self,
        request: &ObjectBucketCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<ObjectBucket, CloudError> {
        let budget = timeouts::resolve(ResourceKind::ObjectBucket, timeout_override)?;
        let url = format!("{}/objects/buckets", self.api_base());
        let created: ObjectBucket = self.post_json(&url, request).await?;

        let handle = ResourceHandle::new(ResourceKind::ObjectBucket, created.metadata.resource_id);
        debug!(%handle, "bucket create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_object_bucket(handle.id())).await
    }

    /// Fetch a bucket by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_object_bucket(&self, resource_id: &str) -> Result<ObjectBucket, CloudError> {
        let url = format!("{}/objects/buckets/id/{resource_id}", self.api_base());
        self.get_json(&url).await
    }

    /// Delete a bucket by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_object_bucket(&self, resource_id: &str) -> Result<(), CloudError> {
        let url = format!("{}/objects/buckets/id/{resource_id}", self.api_base());
        self.delete_resource(&url).await
    }

    /// Create an object user and wait until it is ready.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if the backend
    /// reports `ObjectUserFailed`, [`CloudError::Timeout`] if the
    /// budget elapses, or any classified API error.
    pub async fn create_object_user(
        &self,
        request: &ObjectUserCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<ObjectUser, CloudError> {
        let budget = timeouts::resolve(ResourceKind::ObjectUser, timeout_override)?;
        let url = format!("{}/objects/users", self.api_base());
        let created: ObjectUser = self.post_json(&url, request).await?;

        let handle = ResourceHandle::new(ResourceKind::ObjectUser, created.metadata.user_id);
        debug!(%handle, "object user create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_object_user(handle.id())).await
    }

    /// Fetch an object user by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_object_user(&self, user_id: &str) -> Result<ObjectUser, CloudError> {
        let url = format!("{}/objects/users/id/{user_id}", self.api_base());
        self.get_json(&url).await
    }

    /// Delete an object user by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_object_user(&self, user_id: &str) -> Result<(), CloudError> {
        let url = format!("{}/objects/users/id/{user_id}", self.api_base());
        self.delete_resource(&url).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn bucket_decodes_wire_names() {
        let body = serde_json::json!({
            "metadata": { "name": "artifacts", "resourceId": "bkt-1", "cloudAccountId": "acct-1" },
            "spec": { "versioned": true, "instanceType": "object-standard",
                      "request": { "size": "5TB" } },
            "status": {
                "phase": "BucketReady",
                "cluster": { "accessEndpoint": "https://s3.test", "clusterId": "c-1" },
                "securityGroup": { "networkFilterAllow": [
                    { "gateway": "10.0.0.1", "prefixLength": 24, "subnet": "10.0.0.0" }
                ]}
            }
        })
        .to_string();

        let bucket: ObjectBucket = serde_json::from_str(&body).unwrap();
        assert_eq!(bucket.metadata.resource_id, "bkt-1");
        assert_eq!(bucket.phase(), "BucketReady");
        assert_eq!(bucket.status.cluster.access_endpoint, "https://s3.test");
        assert_eq!(bucket.status.security_group.network_filter_allow[0].prefix_length, 24);
    }

    #[test]
    fn user_decodes_credentials() {
        let body = serde_json::json!({
            "metadata": { "name": "ci", "userId": "usr-4", "cloudAccountId": "acct-1" },
            "spec": [{ "bucketId": "bkt-1", "actions": ["GetBucketLocation"],
                       "permission": ["ReadBucket"], "prefix": "builds/" }],
            "status": {
                "phase": "ObjectUserReady",
                "principal": { "credentials": { "accessKey": "AK", "secretKey": "SK" } }
            }
        })
        .to_string();

        let user: ObjectUser = serde_json::from_str(&body).unwrap();
        assert_eq!(user.metadata.user_id, "usr-4");
        assert_eq!(user.phase(), "ObjectUserReady");
        assert_eq!(user.spec[0].permissions, vec!["ReadBucket"]);
        assert_eq!(user.status.principal.credentials.access_key, "AK");
    }

    #[test]
    fn user_create_request_serializes_policy_wire_names() {
        let req = ObjectUserCreateRequest {
            metadata: CreateMetadata {
                name: "ci".to_string(),
            },
            spec: vec![BucketPolicy {
                bucket_id: "bkt-1".to_string(),
                actions: vec!["GetBucketLocation".to_string()],
                permissions: vec!["ReadBucket".to_string()],
                prefix: String::new(),
            }],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["spec"][0]["bucketId"], "bkt-1");
        assert_eq!(value["spec"][0]["permission"][0], "ReadBucket");
    }
}
