//! IKS (managed Kubernetes) service.
//!
//! Unique responsibility: lifecycle operations for IKS clusters, node
//! groups, cluster storage and load balancers.
//!
//! Endpoints (all under `{base}/iks`):
//! - GET/POST  `/clusters`
//! - GET/DELETE `/clusters/{clusterUuid}`
//! - POST      `/clusters/{clusterUuid}/upgrade`
//! - GET       `/clusters/{clusterUuid}/kubeconfig`
//! - GET/POST  `/clusters/{clusterUuid}/nodegroups`
//! - GET/PUT/DELETE `/clusters/{clusterUuid}/nodegroups/{nodeGroupUuid}`
//! - POST      `/clusters/{clusterUuid}/storage`
//! - GET/POST  `/clusters/{clusterUuid}/loadbalancers`
//! - GET/PUT/DELETE `/clusters/{clusterUuid}/loadbalancers/{lbId}`
//!
//! Cluster create/upgrade, node group create/scale, storage attach and
//! load balancer create/update are all asynchronous on the backend and
//! reconcile through the shared engine. Storage has no read endpoint
//! of its own: attachment is observed through the owning cluster's
//! storages list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CloudClient;
use crate::errors::CloudError;
use crate::phase::{ResourceHandle, ResourceKind};
use crate::reconciler::{ObservedPhase, ReconcileConfig, wait_for_ready};
use crate::timeouts;

// ============================================================================
// Cluster types
// ============================================================================

/// List envelope for IKS clusters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IksClusterList {
    /// Clusters owned by the account.
    #[serde(default)]
    pub clusters: Vec<IksCluster>,
}

/// An IKS cluster as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IksCluster {
    /// Backend-assigned cluster uuid.
    #[serde(rename = "uuid", default)]
    pub resource_id: String,
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation timestamp.
    #[serde(rename = "createddate", default)]
    pub created_at: String,
    /// Backend-reported state (`Pending`, `Active`, `Failed`, ...).
    #[serde(rename = "clusterstate", default)]
    pub cluster_state: String,
    /// Kubernetes version currently running.
    #[serde(rename = "k8sversion", default)]
    pub k8s_version: String,
    /// Whether an upgrade is available.
    #[serde(rename = "upgradeavailable", default)]
    pub upgrade_available: bool,
    /// Kubernetes versions the cluster can upgrade to.
    #[serde(rename = "upgradek8sversionavailable", default)]
    pub upgradable_k8s_versions: Vec<String>,
    /// Cluster networking configuration.
    #[serde(default)]
    pub network: ClusterNetwork,
    /// Node groups attached to the cluster.
    #[serde(default)]
    pub nodegroups: Vec<NodeGroup>,
    /// Whether cluster storage is enabled.
    #[serde(rename = "storageenabled", default)]
    pub storage_enabled: bool,
    /// Storages attached to the cluster.
    #[serde(default)]
    pub storages: Vec<K8sStorage>,
    /// Virtual IPs fronting the cluster.
    #[serde(default)]
    pub vips: Vec<IksVip>,
}

impl ObservedPhase for IksCluster {
    fn phase(&self) -> &str {
        &self.cluster_state
    }
}

/// Cluster networking configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterNetwork {
    /// Whether load balancers are enabled.
    #[serde(rename = "enableloadbalancer", default)]
    pub enable_load_balancer: bool,
    /// Service CIDR.
    #[serde(rename = "servicecidr", default)]
    pub service_cidr: String,
    /// Cluster CIDR.
    #[serde(rename = "clustercidr", default)]
    pub cluster_cidr: String,
    /// Cluster DNS address.
    #[serde(rename = "clusterdns", default)]
    pub cluster_dns: String,
}

/// A virtual IP fronting cluster services.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IksVip {
    /// VIP id.
    #[serde(rename = "vipid", default)]
    pub id: i64,
    /// VIP name.
    #[serde(default)]
    pub name: String,
    /// VIP state.
    #[serde(rename = "vipstate", default)]
    pub state: String,
    /// Assigned address.
    #[serde(rename = "vipIp", default)]
    pub ip: String,
    /// Fronting port.
    #[serde(default)]
    pub port: i64,
    /// Backing pool port.
    #[serde(rename = "poolport", default)]
    pub pool_port: i64,
    /// VIP type.
    #[serde(rename = "viptype", default)]
    pub vip_type: String,
}

/// Request body for cluster creation.
#[derive(Debug, Clone, Serialize)]
pub struct IksClusterCreateRequest {
    /// Caller-chosen cluster name.
    pub name: String,
    /// Initial node count.
    pub count: i64,
    /// Kubernetes version to run.
    #[serde(rename = "k8sversionname")]
    pub k8s_version: String,
    /// Control-plane instance type.
    #[serde(rename = "instanceType")]
    pub instance_type: String,
    /// Container runtime name.
    #[serde(rename = "runtimename")]
    pub runtime_name: String,
}

#[derive(Debug, Serialize)]
struct UpgradeClusterPayload {
    #[serde(rename = "k8sversionname")]
    k8s_version: String,
}

#[derive(Debug, Default, Deserialize)]
struct KubeconfigResponse {
    #[serde(default)]
    kubeconfig: String,
}

// ============================================================================
// Node group types
// ============================================================================

/// A node group as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeGroup {
    /// Owning cluster uuid.
    #[serde(rename = "clusteruuid", default)]
    pub cluster_id: String,
    /// Backend-assigned node group uuid.
    #[serde(rename = "nodegroupuuid", default)]
    pub id: String,
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Node count.
    #[serde(default)]
    pub count: i64,
    /// Instance type id of the nodes.
    #[serde(rename = "instancetypeid", default)]
    pub instance_type: String,
    /// Backend-reported state (`Updating`, `Active`, `Failed`, ...).
    #[serde(rename = "nodegroupstate", default)]
    pub state: String,
    /// SSH keys authorized on the nodes.
    #[serde(rename = "sshkeyname", default)]
    pub ssh_key_names: Vec<SshKeyName>,
    /// Network interface name on the nodes.
    #[serde(rename = "networkinterfacename", default)]
    pub network_interface_name: String,
    /// Machine image instance id.
    #[serde(rename = "imiid", default)]
    pub imi_id: String,
    /// Cloud-init user data URL.
    #[serde(rename = "userdataurl", default)]
    pub user_data_url: String,
    /// Virtual networks the nodes attach to.
    #[serde(default)]
    pub vnets: Vec<NodeGroupVnet>,
}

impl ObservedPhase for NodeGroup {
    fn phase(&self) -> &str {
        &self.state
    }
}

/// SSH key reference on a node group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshKeyName {
    /// Key name.
    #[serde(rename = "sshkey", default)]
    pub name: String,
}

/// Virtual network attachment for node group nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeGroupVnet {
    /// Availability zone of the vnet.
    #[serde(rename = "availabilityzonename", default)]
    pub availability_zone: String,
    /// Vnet name the node interfaces attach to.
    #[serde(rename = "networkinterfacevnetname", default)]
    pub vnet: String,
}

/// Request body for node group creation.
#[derive(Debug, Clone, Serialize)]
pub struct IksNodeGroupCreateRequest {
    /// Node count.
    pub count: i64,
    /// Caller-chosen name.
    pub name: String,
    /// Product type of the nodes.
    #[serde(rename = "instanceType")]
    pub product_type: String,
    /// Instance type id of the nodes.
    #[serde(rename = "instancetypeid")]
    pub instance_type_id: String,
    /// SSH keys to authorize on the nodes.
    #[serde(rename = "sshkeyname")]
    pub ssh_key_names: Vec<SshKeyName>,
    /// Cloud-init user data URL.
    #[serde(rename = "userdataurl")]
    pub user_data_url: String,
    /// Virtual networks to attach.
    pub vnets: Vec<NodeGroupVnet>,
}

#[derive(Debug, Serialize)]
struct UpdateNodeGroupPayload {
    count: i64,
}

// ============================================================================
// Storage types
// ============================================================================

/// Cluster storage as reported in the cluster's storages list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct K8sStorage {
    /// Storage provider.
    #[serde(rename = "storageprovider", default)]
    pub provider: String,
    /// Provisioned size string.
    #[serde(default)]
    pub size: String,
    /// Backend-reported state (`Active`, `Failed`, ...).
    #[serde(default)]
    pub state: String,
}

impl ObservedPhase for K8sStorage {
    fn phase(&self) -> &str {
        &self.state
    }
}

/// Request body for attaching storage to a cluster.
#[derive(Debug, Clone, Serialize)]
pub struct IksStorageCreateRequest {
    /// Whether to enable cluster storage.
    #[serde(rename = "enablestorage")]
    pub enable: bool,
    /// Size to provision.
    #[serde(rename = "storagesize")]
    pub size: String,
}

// ============================================================================
// Load balancer types
// ============================================================================

/// List envelope for load balancers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadBalancerList {
    /// Load balancers attached to the cluster.
    #[serde(default)]
    pub items: Vec<IksLoadBalancer>,
}

/// An IKS load balancer as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IksLoadBalancer {
    /// Identity and ownership.
    #[serde(default)]
    pub metadata: LoadBalancerMetadata,
    /// Requested configuration.
    #[serde(default)]
    pub spec: LoadBalancerSpec,
    /// Observed state.
    #[serde(default)]
    pub status: LoadBalancerStatus,
}

impl ObservedPhase for IksLoadBalancer {
    fn phase(&self) -> &str {
        &self.status.state
    }
}

/// Load balancer identity block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadBalancerMetadata {
    /// Owning cloud account.
    #[serde(rename = "cloudAccountId", default)]
    pub cloudaccount: String,
    /// Caller-chosen name.
    #[serde(default)]
    pub name: String,
    /// Backend-assigned resource id.
    #[serde(rename = "resourceId", default)]
    pub resource_id: String,
    /// Resource version for optimistic updates.
    #[serde(rename = "resourceVersion", default)]
    pub resource_version: String,
    /// Labels attached to the load balancer.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Load balancer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    /// Listener definitions.
    #[serde(default)]
    pub listeners: Vec<LoadBalancerListener>,
    /// Source restrictions.
    #[serde(default)]
    pub security: LoadBalancerSecurity,
    /// Exposure schema.
    #[serde(default)]
    pub schema: String,
}

/// A load balancer listener.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadBalancerListener {
    /// Fronting port.
    #[serde(default)]
    pub port: i64,
    /// Backing pool.
    #[serde(default)]
    pub pool: LoadBalancerPool,
    /// Protocol (`TCP`, `UDP`, ...).
    #[serde(default)]
    pub protocol: String,
}

/// Backing pool of a listener.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadBalancerPool {
    /// Pool member port.
    #[serde(default)]
    pub port: i64,
    /// Health monitor type.
    #[serde(default)]
    pub monitor: String,
    /// Load balancing mode.
    #[serde(rename = "loadBalancingMode", default)]
    pub load_balancing_mode: String,
    /// Node group backing the pool.
    #[serde(rename = "nodeGroupID", default)]
    pub node_group_id: String,
}

/// Source IP restrictions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadBalancerSecurity {
    /// Allowed source CIDRs.
    #[serde(rename = "sourceips", default)]
    pub source_ips: Vec<String>,
}

/// Observed load balancer state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadBalancerStatus {
    /// Backend-reported state (`Pending`, `Active`, ...). The wire
    /// exposes no failed state for load balancers.
    #[serde(default)]
    pub state: String,
    /// Assigned virtual IP.
    #[serde(default)]
    pub vip: String,
    /// Backend status message.
    #[serde(default)]
    pub message: String,
}

/// Request body for load balancer creation.
#[derive(Debug, Clone, Serialize)]
pub struct IksLoadBalancerCreateRequest {
    /// Identity of the new load balancer.
    pub metadata: LoadBalancerCreateMetadata,
    /// Requested configuration.
    pub spec: LoadBalancerSpec,
}

/// Metadata block for load balancer creation.
#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerCreateMetadata {
    /// Owning cloud account.
    #[serde(rename = "cloudAccountId")]
    pub cloudaccount: String,
    /// Caller-chosen name.
    pub name: String,
    /// Labels to attach.
    pub labels: HashMap<String, String>,
    /// Owning cluster uuid.
    #[serde(rename = "clusteruuid")]
    pub cluster_id: String,
}

/// Request body for load balancer updates.
#[derive(Debug, Clone, Serialize)]
pub struct IksLoadBalancerUpdateRequest {
    /// Identity of the load balancer being updated.
    pub metadata: LoadBalancerUpdateMetadata,
    /// Replacement configuration.
    pub spec: LoadBalancerUpdateSpec,
}

/// Metadata block for load balancer updates. Key casing follows the
/// wire contract exactly.
#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerUpdateMetadata {
    /// Owning cloud account.
    #[serde(rename = "cloudAccountid")]
    pub cloudaccount: String,
    /// Backend-assigned resource id.
    #[serde(rename = "resourceid")]
    pub resource_id: String,
    /// Resource version for optimistic updates.
    #[serde(rename = "resourceVersion")]
    pub resource_version: String,
    /// Labels to attach.
    pub labels: HashMap<String, String>,
    /// Owning cluster uuid.
    #[serde(rename = "clusteruuid")]
    pub cluster_id: String,
}

/// Spec block for load balancer updates.
#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerUpdateSpec {
    /// Replacement listeners.
    pub listeners: Vec<LoadBalancerListener>,
    /// Replacement source restrictions.
    pub security: LoadBalancerSecurity,
}

// ============================================================================
// Cluster operations
// ============================================================================

impl CloudClient {
    /// List the account's IKS clusters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn list_iks_clusters(&self) -> Result<Vec<IksCluster>, CloudError> {
        let url = format!("{}/iks/clusters", self.api_base());
        let list: IksClusterList = self.get_json(&url).await?;
        Ok(list.clusters)
    }

    /// Create an IKS cluster and wait until it is active.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if the cluster
    /// reports `Failed`, [`CloudError::Timeout`] if the budget
    /// elapses, or any classified API error.
    pub async fn create_iks_cluster(
        &self,
        request: &IksClusterCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<IksCluster, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksCluster, timeout_override)?;
        let url = format!("{}/iks/clusters", self.api_base());
        let created: IksCluster = self.post_json(&url, request).await?;

        let handle = ResourceHandle::new(ResourceKind::IksCluster, created.resource_id);
        debug!(%handle, "iks cluster create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_iks_cluster(handle.id())).await
    }

    /// Fetch an IKS cluster by uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_iks_cluster(&self, cluster_id: &str) -> Result<IksCluster, CloudError> {
        let url = format!("{}/iks/clusters/{cluster_id}", self.api_base());
        self.get_json(&url).await
    }

    /// Delete an IKS cluster by uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_iks_cluster(&self, cluster_id: &str) -> Result<(), CloudError> {
        let url = format!("{}/iks/clusters/{cluster_id}", self.api_base());
        self.delete_resource(&url).await
    }

    /// Upgrade a cluster to a new Kubernetes version and wait until it
    /// is active again.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CloudClient::create_iks_cluster`].
    pub async fn upgrade_iks_cluster(
        &self,
        cluster_id: &str,
        k8s_version: &str,
        timeout_override: Option<&str>,
    ) -> Result<IksCluster, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksCluster, timeout_override)?;
        let url = format!("{}/iks/clusters/{cluster_id}/upgrade", self.api_base());
        let payload = UpgradeClusterPayload {
            k8s_version: k8s_version.to_string(),
        };
        let _accepted: IksCluster = self.post_json(&url, &payload).await?;

        debug!(cluster_id, k8s_version, "iks cluster upgrade accepted, reconciling");
        let cfg = ReconcileConfig::new(ResourceKind::IksCluster, budget);
        wait_for_ready(&cfg, || self.get_iks_cluster(cluster_id)).await
    }

    /// Fetch the cluster's kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_kubeconfig(&self, cluster_id: &str) -> Result<String, CloudError> {
        let url = format!("{}/iks/clusters/{cluster_id}/kubeconfig", self.api_base());
        let resp: KubeconfigResponse = self.get_json(&url).await?;
        Ok(resp.kubeconfig)
    }
}

// ============================================================================
// Node group operations
// ============================================================================

impl CloudClient {
    /// Create a node group and wait until it is active.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if the node
    /// group reports `Failed`, [`CloudError::Timeout`] if the budget
    /// elapses, or any classified API error.
    pub async fn create_iks_node_group(
        &self,
        cluster_id: &str,
        request: &IksNodeGroupCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<NodeGroup, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksNodeGroup, timeout_override)?;
        let url = format!("{}/iks/clusters/{cluster_id}/nodegroups", self.api_base());
        let created: NodeGroup = self.post_json(&url, request).await?;

        let handle = ResourceHandle::new(ResourceKind::IksNodeGroup, created.id);
        debug!(%handle, cluster_id, "iks node group create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_iks_node_group(cluster_id, handle.id())).await
    }

    /// Fetch a node group by uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_iks_node_group(
        &self,
        cluster_id: &str,
        node_group_id: &str,
    ) -> Result<NodeGroup, CloudError> {
        let url = format!(
            "{}/iks/clusters/{cluster_id}/nodegroups/{node_group_id}",
            self.api_base()
        );
        self.get_json(&url).await
    }

    /// Scale a node group to `count` nodes and wait until it is active
    /// again.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CloudClient::create_iks_node_group`].
    pub async fn update_iks_node_group_count(
        &self,
        cluster_id: &str,
        node_group_id: &str,
        count: i64,
        timeout_override: Option<&str>,
    ) -> Result<NodeGroup, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksNodeGroup, timeout_override)?;
        let url = format!(
            "{}/iks/clusters/{cluster_id}/nodegroups/{node_group_id}",
            self.api_base()
        );
        self.put_json(&url, &UpdateNodeGroupPayload { count }).await?;

        debug!(cluster_id, node_group_id, count, "iks node group scale accepted, reconciling");
        let cfg = ReconcileConfig::new(ResourceKind::IksNodeGroup, budget);
        wait_for_ready(&cfg, || self.get_iks_node_group(cluster_id, node_group_id)).await
    }

    /// Delete a node group by uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_iks_node_group(
        &self,
        cluster_id: &str,
        node_group_id: &str,
    ) -> Result<(), CloudError> {
        let url = format!(
            "{}/iks/clusters/{cluster_id}/nodegroups/{node_group_id}",
            self.api_base()
        );
        self.delete_resource(&url).await
    }
}

// ============================================================================
// Storage operations
// ============================================================================

impl CloudClient {
    /// Attach storage to a cluster and wait until it is active.
    ///
    /// Storage has no read endpoint of its own, so the poll fetches
    /// the owning cluster and matches the storage entry by size.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::PhaseFailed`] if the storage
    /// reports `Failed`, [`CloudError::Timeout`] if the budget
    /// elapses, or any classified API error.
    pub async fn attach_iks_storage(
        &self,
        cluster_id: &str,
        request: &IksStorageCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<K8sStorage, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksCluster, timeout_override)?;
        let url = format!("{}/iks/clusters/{cluster_id}/storage", self.api_base());
        let accepted: K8sStorage = self.post_json(&url, request).await?;
        let size = if accepted.size.is_empty() {
            request.size.clone()
        } else {
            accepted.size
        };

        debug!(cluster_id, size = %size, "iks storage attach accepted, reconciling");
        let cfg = ReconcileConfig::new(ResourceKind::IksCluster, budget);
        wait_for_ready(&cfg, || self.observe_iks_storage(cluster_id, &size)).await
    }

    /// One storage poll tick: read the cluster and project the storage
    /// entry matching `size`. An absent entry observes as pending.
    async fn observe_iks_storage(
        &self,
        cluster_id: &str,
        size: &str,
    ) -> Result<K8sStorage, CloudError> {
        let cluster = self.get_iks_cluster(cluster_id).await?;
        Ok(cluster
            .storages
            .into_iter()
            .find(|s| s.size.eq_ignore_ascii_case(size))
            .unwrap_or_default())
    }
}

// ============================================================================
// Load balancer operations
// ============================================================================

impl CloudClient {
    /// List the cluster's load balancers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn list_iks_load_balancers(
        &self,
        cluster_id: &str,
    ) -> Result<Vec<IksLoadBalancer>, CloudError> {
        let url = format!("{}/iks/clusters/{cluster_id}/loadbalancers", self.api_base());
        let list: LoadBalancerList = self.get_json(&url).await?;
        Ok(list.items)
    }

    /// Create a load balancer and wait until it is active.
    ///
    /// The wire exposes no failed phase for load balancers, so a
    /// provisioning failure surfaces as [`CloudError::Timeout`] at the
    /// deadline rather than as a phase failure.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] for an unparseable
    /// `timeout_override`, [`CloudError::Timeout`] if the budget
    /// elapses, or any classified API error.
    pub async fn create_iks_load_balancer(
        &self,
        cluster_id: &str,
        request: &IksLoadBalancerCreateRequest,
        timeout_override: Option<&str>,
    ) -> Result<IksLoadBalancer, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksLoadBalancer, timeout_override)?;
        let url = format!("{}/iks/clusters/{cluster_id}/loadbalancers", self.api_base());
        let created: IksLoadBalancer = self.post_json(&url, request).await?;

        let handle =
            ResourceHandle::new(ResourceKind::IksLoadBalancer, created.metadata.resource_id);
        debug!(%handle, cluster_id, "iks load balancer create accepted, reconciling");
        let cfg = ReconcileConfig::new(handle.kind(), budget);
        wait_for_ready(&cfg, || self.get_iks_load_balancer(cluster_id, handle.id())).await
    }

    /// Fetch a load balancer by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn get_iks_load_balancer(
        &self,
        cluster_id: &str,
        lb_id: &str,
    ) -> Result<IksLoadBalancer, CloudError> {
        let url = format!(
            "{}/iks/clusters/{cluster_id}/loadbalancers/{lb_id}",
            self.api_base()
        );
        self.get_json(&url).await
    }

    /// Replace a load balancer's listeners/security and wait until it
    /// is active again. Deadline-only, like creation.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CloudClient::create_iks_load_balancer`].
    pub async fn update_iks_load_balancer(
        &self,
        cluster_id: &str,
        lb_id: &str,
        request: &IksLoadBalancerUpdateRequest,
        timeout_override: Option<&str>,
    ) -> Result<IksLoadBalancer, CloudError> {
        let budget = timeouts::resolve(ResourceKind::IksLoadBalancer, timeout_override)?;
        let url = format!(
            "{}/iks/clusters/{cluster_id}/loadbalancers/{lb_id}",
            self.api_base()
        );
        self.put_json(&url, request).await?;

        debug!(cluster_id, lb_id, "iks load balancer update accepted, reconciling");
        let cfg = ReconcileConfig::new(ResourceKind::IksLoadBalancer, budget);
        wait_for_ready(&cfg, || self.get_iks_load_balancer(cluster_id, lb_id)).await
    }

    /// Delete a load balancer by resource id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the control plane
    /// rejects it.
    pub async fn delete_iks_load_balancer(
        &self,
        cluster_id: &str,
        lb_id: &str,
    ) -> Result<(), CloudError> {
        let url = format!(
            "{}/iks/clusters/{cluster_id}/loadbalancers/{lb_id}",
            self.api_base()
        );
        self.delete_resource(&url).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn cluster_decodes_wire_names() {
        let body = serde_json::json!({
            "uuid": "cl-7",
            "name": "workbench",
            "createddate": "2025-11-02",
            "clusterstate": "Active",
            "k8sversion": "1.30",
            "upgradeavailable": true,
            "upgradek8sversionavailable": ["1.31"],
            "network": { "enableloadbalancer": true, "servicecidr": "10.96.0.0/12" },
            "nodegroups": [{
                "clusteruuid": "cl-7",
                "nodegroupuuid": "ng-1",
                "name": "workers",
                "count": 3,
                "instancetypeid": "gpu-small",
                "nodegroupstate": "Active",
                "sshkeyname": [{ "sshkey": "ops" }],
                "vnets": [{ "availabilityzonename": "us-region-1a",
                            "networkinterfacevnetname": "us-region-1a-default" }]
            }],
            "storageenabled": true,
            "storages": [{ "storageprovider": "weka", "size": "100GB", "state": "Active" }]
        })
        .to_string();

        let cluster: IksCluster = serde_json::from_str(&body).unwrap();
        assert_eq!(cluster.resource_id, "cl-7");
        assert_eq!(cluster.phase(), "Active");
        assert_eq!(cluster.nodegroups[0].id, "ng-1");
        assert_eq!(cluster.nodegroups[0].ssh_key_names[0].name, "ops");
        assert_eq!(cluster.storages[0].size, "100GB");
        assert!(cluster.network.enable_load_balancer);
    }

    #[test]
    fn cluster_create_request_serializes_wire_names() {
        let req = IksClusterCreateRequest {
            name: "workbench".to_string(),
            count: 1,
            k8s_version: "1.30".to_string(),
            instance_type: "cp-medium".to_string(),
            runtime_name: "containerd".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["k8sversionname"], "1.30");
        assert_eq!(value["instanceType"], "cp-medium");
        assert_eq!(value["runtimename"], "containerd");
    }

    #[test]
    fn load_balancer_decodes_status_state() {
        let body = serde_json::json!({
            "metadata": { "cloudAccountId": "acct-1", "name": "ingress", "resourceId": "lb-3" },
            "spec": {
                "listeners": [{
                    "port": 443,
                    "protocol": "TCP",
                    "pool": { "port": 8443, "monitor": "tcp",
                              "loadBalancingMode": "roundRobin", "nodeGroupID": "ng-1" }
                }],
                "security": { "sourceips": ["0.0.0.0/0"] }
            },
            "status": { "state": "Pending", "vip": "", "message": "allocating" }
        })
        .to_string();

        let lb: IksLoadBalancer = serde_json::from_str(&body).unwrap();
        assert_eq!(lb.metadata.resource_id, "lb-3");
        assert_eq!(lb.phase(), "Pending");
        assert_eq!(lb.spec.listeners[0].pool.node_group_id, "ng-1");
    }

    #[test]
    fn node_group_with_no_state_observes_as_pending() {
        let ng: NodeGroup = serde_json::from_str(r#"{"nodegroupuuid":"ng-2"}"#).unwrap();
        assert_eq!(
            ResourceKind::IksNodeGroup.classify(ng.phase()),
            crate::phase::PollOutcome::Pending
        );
    }
}
