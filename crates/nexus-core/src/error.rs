//! Error types for nexus-core

use thiserror::Error;

use crate::fetch::Requirement;
use crate::gateway::GatewayError;
use crate::moveout::SyncError;

/// Result type alias using nexus-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nexus-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote gateway error
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Moveout list sync error
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure taxonomy used to decide how a failure reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required fetch failed.
    Network,
    /// A role-gated or otherwise optional fetch failed.
    OptionalResource,
    /// Client-side validation rejected the request before any network call.
    Validation,
    /// Best-effort notification broadcast failed after a successful mutation.
    Notification,
}

/// How a failure is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Blocking error banner; nothing else can be shown.
    Blocking,
    /// Short-lived transient message; stale data stays visible.
    Toast,
    /// Logged only.
    Silent,
}

impl FailureKind {
    /// Presentation for this failure kind.
    ///
    /// `has_prior_value` only matters for [`FailureKind::Network`]: a required
    /// resource that still has data to show degrades to a toast.
    pub const fn surface(self, has_prior_value: bool) -> Surface {
        match self {
            Self::Network if has_prior_value => Surface::Toast,
            Self::Network | Self::Validation => Surface::Blocking,
            Self::OptionalResource | Self::Notification => Surface::Silent,
        }
    }

    /// Failure kind of a fetch with the given requirement.
    pub const fn for_requirement(requirement: Requirement) -> Self {
        match requirement {
            Requirement::Required => Self::Network,
            Requirement::Optional => Self::OptionalResource,
        }
    }
}

/// Presentation for a failed fetch.
pub const fn surface_for(requirement: Requirement, has_prior_value: bool) -> Surface {
    FailureKind::for_requirement(requirement).surface(has_prior_value)
}
