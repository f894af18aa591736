//! Operation timeout scope.
//!
//! Unique responsibility: resolve the overall time budget for a
//! create/update/delete operation - the per-kind static default, or a
//! caller-supplied duration string override.
//!
//! The resolved duration bounds the whole operation: the mutating call
//! and the reconciliation loop together can never exceed it. An
//! override that fails to parse is a hard [`CloudError::Config`] error
//! raised before any network call, never a silent fallback.

use std::time::Duration;

use crate::errors::CloudError;
use crate::phase::ResourceKind;

/// Fixed interval between reconciliation polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default budget for compute instance operations.
pub const INSTANCE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// Default budget for IKS cluster operations (create and upgrade).
pub const IKS_CLUSTER_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default budget for IKS node group operations.
pub const IKS_NODE_GROUP_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default budget for IKS load balancer operations.
pub const IKS_LOAD_BALANCER_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default budget for filesystem operations.
pub const FILESYSTEM_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Default budget for object storage operations (buckets and users).
pub const OBJECT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Static default timeout for a resource kind.
#[must_use]
pub const fn default_timeout(kind: ResourceKind) -> Duration {
    match kind {
        ResourceKind::Instance => INSTANCE_TIMEOUT,
        ResourceKind::IksCluster => IKS_CLUSTER_TIMEOUT,
        ResourceKind::IksNodeGroup => IKS_NODE_GROUP_TIMEOUT,
        ResourceKind::IksLoadBalancer => IKS_LOAD_BALANCER_TIMEOUT,
        ResourceKind::Filesystem => FILESYSTEM_TIMEOUT,
        ResourceKind::ObjectBucket | ResourceKind::ObjectUser => OBJECT_STORAGE_TIMEOUT,
    }
}

/// Resolve the operation timeout for `kind`.
///
/// A present, non-blank `override_` must parse as a duration string
/// (`"45s"`, `"15m"`, `"1h"`); a blank or absent override selects the
/// static default.
///
/// # Errors
///
/// Returns [`CloudError::Config`] if the override does not parse.
pub fn resolve(kind: ResourceKind, override_: Option<&str>) -> Result<Duration, CloudError> {
    match override_ {
        Some(raw) if !raw.trim().is_empty() => parse_duration(raw).map_err(|reason| {
            CloudError::Config(format!("invalid timeout {raw:?} for resource {kind}: {reason}"))
        }),
        _ => Ok(default_timeout(kind)),
    }
}

/// Parse a duration string with a mandatory unit suffix.
///
/// Accepted suffixes: `ms`, `s`, `m`, `h`. A bare number is rejected
/// so a caller cannot accidentally pass millis where seconds were
/// meant.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix("ms") {
        parse_count(stripped, s).map(Duration::from_millis)
    } else if let Some(stripped) = s.strip_suffix('s') {
        parse_count(stripped, s).map(Duration::from_secs)
    } else if let Some(stripped) = s.strip_suffix('m') {
        parse_count(stripped, s).map(|mins| Duration::from_secs(mins * 60))
    } else if let Some(stripped) = s.strip_suffix('h') {
        parse_count(stripped, s).map(|hours| Duration::from_secs(hours * 3600))
    } else {
        Err(format!("missing duration unit in {s:?}"))
    }
}

fn parse_count(raw: &str, original: &str) -> Result<u64, String> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid duration {original:?}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_match_the_static_table() {
        assert_eq!(
            default_timeout(ResourceKind::Instance),
            Duration::from_secs(900)
        );
        assert_eq!(
            default_timeout(ResourceKind::IksCluster),
            Duration::from_secs(1800)
        );
        assert_eq!(
            default_timeout(ResourceKind::IksNodeGroup),
            Duration::from_secs(1800)
        );
        assert_eq!(
            default_timeout(ResourceKind::Filesystem),
            Duration::from_secs(300)
        );
        assert_eq!(
            default_timeout(ResourceKind::ObjectBucket),
            Duration::from_secs(300)
        );
        assert_eq!(
            default_timeout(ResourceKind::ObjectUser),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn absent_or_blank_override_selects_default() {
        assert_eq!(
            resolve(ResourceKind::Instance, None).unwrap(),
            Duration::from_secs(900)
        );
        assert_eq!(
            resolve(ResourceKind::Instance, Some("")).unwrap(),
            Duration::from_secs(900)
        );
        assert_eq!(
            resolve(ResourceKind::Instance, Some("   ")).unwrap(),
            Duration::from_secs(900)
        );
    }

    #[test]
    fn override_parses_as_duration() {
        assert_eq!(
            resolve(ResourceKind::Instance, Some("45s")).unwrap(),
            Duration::from_secs(45)
        );
        assert_eq!(
            resolve(ResourceKind::IksCluster, Some("1h")).unwrap(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            resolve(ResourceKind::Filesystem, Some("500ms")).unwrap(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn bogus_override_is_a_config_error_not_zero() {
        let err = resolve(ResourceKind::Instance, Some("bogus")).unwrap_err();
        match err {
            CloudError::Config(msg) => {
                assert!(msg.contains("bogus"));
                assert!(msg.contains("instance"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bare_number_is_rejected() {
        assert!(resolve(ResourceKind::Instance, Some("45")).is_err());
    }

    #[test]
    fn negative_and_garbage_counts_are_rejected() {
        assert!(resolve(ResourceKind::Instance, Some("-5s")).is_err());
        assert!(resolve(ResourceKind::Instance, Some("fivem")).is_err());
    }
}
