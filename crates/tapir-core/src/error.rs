//! Error types shared by the sandman components.

use thiserror::Error;

use crate::types::InstanceId;

/// Result type alias for sandman operations.
pub type TapirResult<T> = Result<T, TapirError>;

/// Errors that abort a run. None of them are retried locally.
#[derive(Debug, Error)]
pub enum TapirError {
    #[error("telemetry query failed for {instance} ({metric}): {reason}")]
    Telemetry {
        instance: InstanceId,
        metric: String,
        reason: String,
    },

    #[error("group membership listing failed: {0}")]
    Membership(String),

    #[error("failed to terminate {instance}: {reason}")]
    Termination { instance: InstanceId, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
