use crate::control_plane::{ControlPlaneError, ErrorKind};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The remote call a control-plane failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateRole,
    AttachPolicy,
    GetRole,
    DetachPolicy,
    DeleteRole,
    CreateCluster,
    DescribeCluster,
    DeleteCluster,
    GetSecurityGroup,
    AuthorizeIngress,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::CreateRole => "create role",
            Step::AttachPolicy => "attach access policy",
            Step::GetRole => "look up role",
            Step::DetachPolicy => "detach access policy",
            Step::DeleteRole => "delete role",
            Step::CreateCluster => "create cluster",
            Step::DescribeCluster => "describe cluster",
            Step::DeleteCluster => "delete cluster",
            Step::GetSecurityGroup => "look up default security group",
            Step::AuthorizeIngress => "authorize ingress",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DwhError {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("missing config key '{key}' in section '{section}'")]
    MissingKey { section: String, key: String },

    #[error("invalid value for '{section}.{key}': {reason}")]
    InvalidValue {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed config file: {0}")]
    MalformedConfig(String),

    #[error("{step} failed: {source}")]
    ControlPlane {
        step: Step,
        #[source]
        source: ControlPlaneError,
    },

    #[error("role '{0}' has its policy attached but cannot be looked up")]
    RoleNotFound(String),

    #[error("gave up waiting for {what} after {}s", .elapsed.as_secs())]
    PollTimeout { what: String, elapsed: Duration },

    #[error("cancelled while waiting for {0}")]
    Cancelled(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DwhError {
    pub fn step(step: Step, source: ControlPlaneError) -> Self {
        DwhError::ControlPlane { step, source }
    }

    /// The classified control-plane cause, if this error came from a remote call.
    pub fn control_plane_kind(&self) -> Option<ErrorKind> {
        match self {
            DwhError::ControlPlane { source, .. } => Some(source.kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DwhError>;
