//! Provider-neutral control-plane operations.
//!
//! Any provider offering these verbs can drive the orchestrator. Failures
//! carry an [`ErrorKind`] so callers can decide between "keep going" and
//! "abort" without looking at message text.

use crate::types::{ClusterObservation, ClusterSpec, TrustRole};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::NotFound => "not found",
            ErrorKind::Other => "control plane error",
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ControlPlaneError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ControlPlaneError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, message)
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == ErrorKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

pub type CpResult<T> = std::result::Result<T, ControlPlaneError>;

pub trait IdentityApi {
    fn create_role(&self, role: &TrustRole) -> CpResult<()>;
    fn attach_policy(&self, role_name: &str, policy: &str) -> CpResult<()>;
    /// Returns the role's stable identifier.
    fn get_role(&self, role_name: &str) -> CpResult<String>;
    fn detach_policy(&self, role_name: &str, policy: &str) -> CpResult<()>;
    fn delete_role(&self, role_name: &str) -> CpResult<()>;
}

pub trait ClusterApi {
    fn create_cluster(&self, spec: &ClusterSpec, role_id: &str) -> CpResult<()>;
    fn describe_cluster(&self, cluster_id: &str) -> CpResult<ClusterObservation>;
    fn delete_cluster(&self, cluster_id: &str) -> CpResult<()>;
}

pub trait NetworkApi {
    /// Returns the default security group id of the network.
    fn default_security_group(&self, network_id: &str) -> CpResult<String>;
    fn authorize_ingress(
        &self,
        group_id: &str,
        protocol: &str,
        port: u16,
        cidr: &str,
    ) -> CpResult<()>;
}

/// The three API surfaces the orchestrator talks to.
#[derive(Clone, Copy)]
pub struct ControlPlane<'a> {
    pub identity: &'a dyn IdentityApi,
    pub clusters: &'a dyn ClusterApi,
    pub network: &'a dyn NetworkApi,
}

impl<'a> ControlPlane<'a> {
    /// Use one provider for all three surfaces.
    pub fn uniform<P>(provider: &'a P) -> Self
    where
        P: IdentityApi + ClusterApi + NetworkApi,
    {
        Self {
            identity: provider,
            clusters: provider,
            network: provider,
        }
    }
}
