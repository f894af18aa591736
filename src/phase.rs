//! Resource phase model.
//!
//! Unique responsibility: map backend-reported phase strings onto the
//! three-way poll outcome (`Ready` / `Failed` / `Pending`) for each
//! resource kind.
//!
//! Every resource kind carries its own terminal vocabulary on the wire
//! (a filesystem reports `FSReady`, a bucket reports `BucketReady`, an
//! IKS cluster reports `Active`). The reconciler never looks at raw
//! phase strings; it only consumes the classified outcome.

use std::fmt;

/// Classified outcome of a single poll observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The resource reached its ready terminal phase.
    Ready,
    /// The backend authoritatively reported a failed terminal phase.
    Failed,
    /// Any other phase; keep polling.
    Pending,
}

impl PollOutcome {
    /// Check whether this outcome ends reconciliation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// The resource kinds managed against the control plane.
///
/// Each kind selects a phase vocabulary and a default operation
/// timeout (see [`crate::timeouts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Shared filesystem.
    Filesystem,
    /// Object storage bucket.
    ObjectBucket,
    /// Object storage access principal.
    ObjectUser,
    /// Compute instance.
    Instance,
    /// IKS Kubernetes cluster.
    IksCluster,
    /// IKS node group within a cluster.
    IksNodeGroup,
    /// IKS load balancer within a cluster.
    IksLoadBalancer,
}

impl ResourceKind {
    /// Stable lowercase name used in log lines and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::ObjectBucket => "objectstorage",
            Self::ObjectUser => "objectuser",
            Self::Instance => "instance",
            Self::IksCluster => "ikscluster",
            Self::IksNodeGroup => "iksnodegroup",
            Self::IksLoadBalancer => "iksloadbalancer",
        }
    }

    /// Classify a backend phase string into a poll outcome.
    ///
    /// Anything outside the kind's terminal vocabulary is `Pending`,
    /// including the empty string. IKS load balancers expose no failed
    /// phase on the wire, so they can only reach `Ready` or run into
    /// the reconciler's deadline.
    #[must_use]
    pub fn classify(self, phase: &str) -> PollOutcome {
        match self {
            Self::Filesystem => match phase {
                "FSReady" => PollOutcome::Ready,
                "FSFailed" => PollOutcome::Failed,
                _ => PollOutcome::Pending,
            },
            Self::ObjectBucket => match phase {
                "BucketReady" => PollOutcome::Ready,
                "BucketFailed" => PollOutcome::Failed,
                _ => PollOutcome::Pending,
            },
            Self::ObjectUser => match phase {
                "ObjectUserReady" => PollOutcome::Ready,
                "ObjectUserFailed" => PollOutcome::Failed,
                _ => PollOutcome::Pending,
            },
            Self::Instance => match phase {
                "Ready" => PollOutcome::Ready,
                "Failed" => PollOutcome::Failed,
                _ => PollOutcome::Pending,
            },
            Self::IksCluster | Self::IksNodeGroup => match phase {
                "Active" => PollOutcome::Ready,
                "Failed" => PollOutcome::Failed,
                _ => PollOutcome::Pending,
            },
            Self::IksLoadBalancer => match phase {
                "Active" => PollOutcome::Ready,
                _ => PollOutcome::Pending,
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a remote resource under reconciliation.
///
/// Pairs the backend-assigned opaque id with its kind so log lines and
/// fetch closures cannot mix resources up. Created from the mutating
/// call's response; owned by the resource-specific caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    kind: ResourceKind,
    id: String,
}

impl ResourceHandle {
    /// Create a handle from a kind and a backend resource id.
    #[must_use]
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// The resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The backend resource id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn filesystem_vocabulary() {
        let kind = ResourceKind::Filesystem;
        assert_eq!(kind.classify("FSReady"), PollOutcome::Ready);
        assert_eq!(kind.classify("FSFailed"), PollOutcome::Failed);
        assert_eq!(kind.classify("FSProvisioning"), PollOutcome::Pending);
        assert_eq!(kind.classify(""), PollOutcome::Pending);
    }

    #[test]
    fn object_storage_vocabulary() {
        assert_eq!(
            ResourceKind::ObjectBucket.classify("BucketReady"),
            PollOutcome::Ready
        );
        assert_eq!(
            ResourceKind::ObjectBucket.classify("BucketFailed"),
            PollOutcome::Failed
        );
        assert_eq!(
            ResourceKind::ObjectUser.classify("ObjectUserReady"),
            PollOutcome::Ready
        );
        assert_eq!(
            ResourceKind::ObjectUser.classify("ObjectUserFailed"),
            PollOutcome::Failed
        );
    }

    #[test]
    fn instance_and_iks_vocabulary() {
        assert_eq!(ResourceKind::Instance.classify("Ready"), PollOutcome::Ready);
        assert_eq!(
            ResourceKind::Instance.classify("Failed"),
            PollOutcome::Failed
        );
        assert_eq!(
            ResourceKind::IksCluster.classify("Active"),
            PollOutcome::Ready
        );
        assert_eq!(
            ResourceKind::IksCluster.classify("Failed"),
            PollOutcome::Failed
        );
        assert_eq!(
            ResourceKind::IksNodeGroup.classify("Updating"),
            PollOutcome::Pending
        );
    }

    #[test]
    fn load_balancer_has_no_failed_phase() {
        let kind = ResourceKind::IksLoadBalancer;
        assert_eq!(kind.classify("Active"), PollOutcome::Ready);
        // Even a phase that looks terminal stays pending; the deadline
        // is the only way out.
        assert_eq!(kind.classify("Failed"), PollOutcome::Pending);
        assert_eq!(kind.classify("Pending"), PollOutcome::Pending);
    }

    #[test]
    fn vocabularies_do_not_bleed_across_kinds() {
        assert_eq!(
            ResourceKind::Instance.classify("FSReady"),
            PollOutcome::Pending
        );
        assert_eq!(
            ResourceKind::Filesystem.classify("Active"),
            PollOutcome::Pending
        );
    }

    #[test]
    fn handle_display_names_kind_and_id() {
        let handle = ResourceHandle::new(ResourceKind::Filesystem, "fs-123");
        assert_eq!(handle.to_string(), "filesystem/fs-123");
        assert_eq!(handle.kind(), ResourceKind::Filesystem);
        assert_eq!(handle.id(), "fs-123");
    }
}
