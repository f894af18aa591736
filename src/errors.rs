//! Error taxonomy and HTTP error classification.
//!
//! Unique responsibility: one crate-wide error type, plus the mapping
//! from a non-200 control-plane response `(status, body)` to a
//! structured error carrying the backend's own message.
//!
//! Error bodies follow the control plane's envelope:
//! `{"code": <int>, "message": <string>, "details": [...]}`.

use std::{fmt, time::Duration};

use serde::Deserialize;

use crate::phase::ResourceKind;

/// Error body envelope returned by the control plane on failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Backend error code.
    #[serde(default)]
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Additional detail objects, passed through uninterpreted.
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

/// Error type for all control-plane operations.
#[derive(Debug)]
pub enum CloudError {
    /// Missing required environment variable.
    MissingEnv(&'static str),
    /// Invalid environment variable value.
    InvalidEnv {
        /// The environment variable key.
        key: &'static str,
        /// The reason for invalidity.
        reason: &'static str,
    },
    /// Invalid caller-supplied configuration (e.g. a timeout override
    /// that does not parse). Raised before any network call is made.
    Config(String),
    /// Connection-level failure after the transport's retry budget.
    Transport(String),
    /// HTTP 401 from the control plane.
    Unauthorized,
    /// HTTP 400 with the backend's message.
    BadRequest(String),
    /// HTTP 404 with the backend's message.
    NotFound(String),
    /// HTTP 500 with the backend's message.
    InternalServer(String),
    /// Any other non-200 status.
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
    /// JSON encode/decode failure.
    Json(String),
    /// The backend authoritatively reported a terminal failure phase.
    /// Never retried.
    PhaseFailed {
        /// The resource kind being reconciled.
        kind: ResourceKind,
        /// The reported phase string.
        phase: String,
    },
    /// The reconciliation deadline elapsed while the resource was
    /// still pending.
    Timeout {
        /// The resource kind being reconciled.
        kind: ResourceKind,
        /// Time spent polling before giving up.
        elapsed: Duration,
    },
}

impl CloudError {
    /// Whether a poll tick may absorb this error and keep polling.
    ///
    /// A single flaky fetch (connection failure, 5xx, garbled body)
    /// must not terminate reconciliation; authoritative rejections
    /// (401/400/404) and configuration errors must.
    #[must_use]
    pub const fn is_poll_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::InternalServer(_) | Self::Api { .. } | Self::Json(_)
        )
    }
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEnv(k) => write!(f, "missing required env var: {k}"),
            Self::InvalidEnv { key, reason } => write!(f, "invalid env var {key}: {reason}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::InternalServer(msg) => write!(f, "internal server error: {msg}"),
            Self::Api { status, message } => {
                write!(f, "error calling api: status={status}, message={message}")
            }
            Self::Json(msg) => write!(f, "json error: {msg}"),
            Self::PhaseFailed { kind, phase } => {
                write!(f, "{kind} state failed (phase {phase:?})")
            }
            Self::Timeout { kind, elapsed } => {
                write!(
                    f,
                    "timeout waiting for {kind} to become ready after {}s",
                    elapsed.as_secs()
                )
            }
        }
    }
}

impl std::error::Error for CloudError {}

/// Map a non-200 control-plane response to a structured error.
///
/// The body is parsed as [`ApiErrorBody`] to extract the backend's
/// message; an unparseable body yields a generic message that still
/// carries the status code. Statuses are never retried here.
#[must_use]
pub fn classify_http_error(status: reqwest::StatusCode, body: &str) -> CloudError {
    let message = api_error_message(status, body);
    match status.as_u16() {
        401 => CloudError::Unauthorized,
        400 => CloudError::BadRequest(message),
        404 => CloudError::NotFound(message),
        500 => CloudError::InternalServer(message),
        _ => CloudError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| format!("error parsing error response (status {})", status.as_u16()),
        |api_error| api_error.message,
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn error_body(message: &str) -> String {
        serde_json::json!({ "code": 3, "message": message, "details": [] }).to_string()
    }

    #[test]
    fn unauthorized_ignores_body() {
        let err = classify_http_error(reqwest::StatusCode::UNAUTHORIZED, "not json");
        assert!(matches!(err, CloudError::Unauthorized));
    }

    #[test]
    fn bad_request_carries_backend_message() {
        let err =
            classify_http_error(reqwest::StatusCode::BAD_REQUEST, &error_body("name taken"));
        match err {
            CloudError::BadRequest(msg) => assert_eq!(msg, "name taken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn not_found_and_server_error_are_distinct() {
        assert!(matches!(
            classify_http_error(reqwest::StatusCode::NOT_FOUND, &error_body("gone")),
            CloudError::NotFound(_)
        ));
        assert!(matches!(
            classify_http_error(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                &error_body("boom")
            ),
            CloudError::InternalServer(_)
        ));
    }

    #[test]
    fn other_statuses_keep_their_code() {
        let err = classify_http_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "{}");
        match err {
            CloudError::Api { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_body_mentions_parsing_and_status() {
        let err = classify_http_error(reqwest::StatusCode::BAD_REQUEST, "<html>oops</html>");
        match err {
            CloudError::BadRequest(msg) => {
                assert!(msg.contains("error parsing error response"));
                assert!(msg.contains("400"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn poll_transience_split() {
        assert!(CloudError::Transport("refused".into()).is_poll_transient());
        assert!(CloudError::InternalServer("boom".into()).is_poll_transient());
        assert!(CloudError::Json("garbled".into()).is_poll_transient());
        assert!(
            CloudError::Api {
                status: 503,
                message: String::new()
            }
            .is_poll_transient()
        );

        assert!(!CloudError::Unauthorized.is_poll_transient());
        assert!(!CloudError::BadRequest("nope".into()).is_poll_transient());
        assert!(!CloudError::NotFound("gone".into()).is_poll_transient());
        assert!(!CloudError::Config("bad".into()).is_poll_transient());
    }

    #[test]
    fn phase_failed_message_contains_failed() {
        let err = CloudError::PhaseFailed {
            kind: ResourceKind::IksCluster,
            phase: "Failed".to_string(),
        };
        assert!(err.to_string().contains("failed"));
        assert!(err.to_string().contains("ikscluster"));
    }

    #[test]
    fn timeout_message_names_kind_and_elapsed() {
        let err = CloudError::Timeout {
            kind: ResourceKind::Instance,
            elapsed: Duration::from_secs(900),
        };
        let msg = err.to_string();
        assert!(msg.contains("instance"));
        assert!(msg.contains("900"));
    }
}
