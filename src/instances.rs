//! Compute instance service.
//!
//! Unique responsibility: lifecycle operations for compute instances.
//!
//! Endpoints:
//! - GET    `{base}/instances`
//! - POST   `{base}/instances`
//! - GET    `{base}/instances/id/{resourceId}`
//! - DELETE `{base}/instances/id/{resourceId}`
//!
//! Instance creation is asynchronous: the POST returns while the
//! machine provisions and the engine polls until `Ready` / `Failed`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CloudClient;
use crate::errors::CloudError;
use crate::phase::{ResourceHandle, ResourceKind};
use crate::reconciler::{ObservedPhase, ReconcileConfig, wait_for_ready};
use crate::timeouts;

/// List envelope for instances.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceList {
    /// Instances owned by the account.
    #[serde(default)]
    pub items: Vec<Instance>,
}

/// A compute instance as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Instance {
    /// Identity and ownership.
    #[serde(default)]
    pub metadata: InstanceMetadata,
    /// Requested configuration.
    #[serde(default)]
    pub spec: InstanceSpec,
    /// Observed state.
    #[serde(default)]
    pub status: InstanceStatus,
}

/// Instance identity block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceMetadata {
    /// Backend-assigned resource id.
    #[serde(rename = "resourceId", default)]
    pub resource_id: String,
    /// Owning cloud account.
    #[serde(rename = "cloudAccountId", default)]
    pub cloudaccount: String,
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Creation timestamp.
    #[serde(rename = "creationTimestamp", default)]
    pub created_at: String,
}

/// Requested instance configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceSpec {
    /// Availability zone hosting the instance.
    #[serde(rename = "availabilityZone", default)]
    pub availability_zone: String,
    /// Instance group, when part of one.
    #[serde(rename = "instanceGroup", default)]
    pub instance_group: String,
    /// Instance type id.
    #[serde(rename = "instanceType", default)]
    pub instance_type: String,
    /// Attached network interfaces.
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
    /// Machine image the instance boots from.
    #[serde(rename = "machineImage", default)]
    pub machine_image: String,
    /// Names of SSH public keys authorized on the instance.
    #[serde(rename = "sshPublicKeyNames", default)]
    pub ssh_public_key_names: Vec<String>,
    /// Cloud-init user data.
    #[serde(rename = "userData", default)]
    pub user_data: String,
}

/// Requested network interface.
///
/// The read endpoint spells the vnet key `vnet` while the create
/// endpoint expects `vNet`; the alias covers both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceSpec {
    /// Interface name.
    #[serde(default)]
    pub name: String,
    /// Virtual network the interface attaches to.
    #[serde(rename = "vNet", alias = "vnet", default)]
    pub vnet: String,
}

/// Observed instance state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceStatus {
    /// Attached interfaces with their assigned addresses.
    #[serde(default)]
    pub interfaces: Vec<InterfaceStatus>,
    /// Backend status message.
    #[serde(default)]
    pub message: String,
    /// Backend-reported phase (`Provisioning`, `Ready`, `Failed`, ...).
    #[serde(default)]
    pub phase: String,
    /// SSH proxy access details.
    #[serde(rename = "sshProxy", default)]
    pub ssh_proxy: SshProxy,
    /// Login user on the instance.
    #[serde(rename = "userName", default)]
    pub user_name: String,
}

/// Observed interface state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceStatus {
    /// Assigned addresses.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// DNS name of the interface.
    #[serde(rename = "dnsName", default)]
    pub dns_name: String,
    /// Gateway address.
    #[serde(default)]
    pub gateway: String,
    /// Interface name.
    #[serde(default)]
    pub name: String,
    /// Subnet prefix length.
    #[serde(rename = "prefixLength", default)]
    pub prefix_length: i64,
    /// Subnet the interface sits in.
    #[serde(default)]
    pub subnet: String,
    /// Virtual network the interface attaches to.
    #[serde(rename = "vNet", default)]
    pub vnet: String,
}

/// SSH proxy access details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SshProxy {
    /// Proxy address.
    #[serde(rename = "proxyAddress", default)]
    pub address: String,
    /// Proxy port.
    #[serde(rename = "proxyPort", default)]
    pub port: i64,
    /// Proxy user.
    #[serde(rename = "proxyUser", default)]
    pub user: String,
}

impl ObservedPhase for Instance {
    fn phase(&self) -> &str {
        &self.status.phase
    }
}

/// Request body for instance creation.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceCreateRequest {
    /// Identity of the new instance.
    pub metadata: CreateMetadata,
    /// Requested configuration.
    pub spec: InstanceCreateSpec,
}

/// Name-only metadata for create requests.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMetadata {
    /// Caller-chosen resource name.
    pub name: String,
}

/// Spec block for instance creation.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceCreateSpec {
    /// Availability zone to create in.
    #[serde(rename = "availabilityZone")]
    pub availability_zone: String,
    /// Instance group to join, if any.
    #[serde(rename = "instanceGroup", skip_serializing_if = "Option::is_none")]
    pub instance_group: Option<String>,
    /// Instance type id.
    #[serde(rename = "instanceType")]
    pub instance_type: String,
    /// Network interfaces to attach.
    pub interfaces: Vec<InterfaceSpec>,
    /// Machine image to boot from.
    #[serde(rename = "machineImage")]
    pub machine_image: String,
    /// Names of SSH public keys to authorize.
    #[serde(rename = "sshPublicKeyNames")]
    pub ssh_public_key_names: Vec<String>,
    /// Cloud-init user data.
    #[serde(rename = "userData", skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

impl CloudClient {
    /// List the account's instances.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn list_instances(&self) -> Result<Vec<Instance>, CloudError> {
        let url = format!("{}/instances", self.api_base());
        let list: InstanceList = self.get_json(&url).await?;
        Ok(list.items)
    }

    /// Create an instance and wait until it is ready.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if provisioning
    /// fails, [`CloudError::Timeout`] if the budget elapses, or any
    /// classified API error.
    pub async fn create_instance(
        &self,
        request: &InstanceCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<Instance, CloudError> {
        let budget = timeouts::resolve(ResourceKind::Instance, timeout_override)?;
        let url = format!("{}/instances", self.api_base());
        let created: Instance = self.post_json(&url, request).await?;

        let handle = ResourceHandle::new(ResourceKind::Instance, created.metadata.resource_id);
        debug!(%handle, "instance create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_instance(handle.id())).await
    }

    /// Fetch an instance by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_instance(&self, resource_id: &str) -> Result<Instance, CloudError> {
        let url = format!("{}/instances/id/{resource_id}", self.api_base());
        self.get_json(&url).await
    }

    /// Delete an instance by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_instance(&self, resource_id: &str) -> Result<(), CloudError> {
        let url = format!("{}/instances/id/{resource_id}", self.api_base());
        self.delete_resource(&url).await
    }
}
