use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub const DEFAULT_SERVICE_PRINCIPAL: &str = "redshift.amazonaws.com";
pub const DEFAULT_ACCESS_POLICY: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";
pub const ROLE_DESCRIPTION: &str =
    "Allows analytic clusters to call cloud services on your behalf.";

// ---------------------------------------------------------------------------
// TrustRole
// ---------------------------------------------------------------------------

/// The identity the cluster assumes to read object storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustRole {
    pub name: String,
    pub path: String,
    pub description: String,
    pub service_principal: String,
    pub access_policy: String,
}

impl TrustRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            description: ROLE_DESCRIPTION.to_string(),
            service_principal: DEFAULT_SERVICE_PRINCIPAL.to_string(),
            access_policy: DEFAULT_ACCESS_POLICY.to_string(),
        }
    }

    /// The assume-role policy document letting the service principal use this role.
    pub fn trust_policy(&self) -> Value {
        json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": self.service_principal },
                }
            ],
        })
    }
}

// ---------------------------------------------------------------------------
// ClusterSpec
// ---------------------------------------------------------------------------

/// Everything needed to request a cluster. Supplied by configuration only.
#[derive(Clone, PartialEq)]
pub struct ClusterSpec {
    pub id: String,
    pub cluster_type: String,
    pub node_type: String,
    pub node_count: u32,
    pub db_name: String,
    pub master_user: String,
    pub master_password: String,
    pub port: u16,
}

impl fmt::Debug for ClusterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSpec")
            .field("id", &self.id)
            .field("cluster_type", &self.cluster_type)
            .field("node_type", &self.node_type)
            .field("node_count", &self.node_count)
            .field("db_name", &self.db_name)
            .field("master_user", &self.master_user)
            .field("master_password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ClusterStatus
// ---------------------------------------------------------------------------

/// Lifecycle status as reported by the control plane.
///
/// Anything the orchestrator does not act on is kept verbatim in `Other` and
/// treated as "not ready yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClusterStatus {
    Creating,
    Available,
    Deleting,
    /// Terminal: the control plane still answers for the cluster but it is gone.
    Deleted,
    Other(String),
}

impl ClusterStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "creating" => ClusterStatus::Creating,
            "available" => ClusterStatus::Available,
            "deleting" => ClusterStatus::Deleting,
            "deleted" => ClusterStatus::Deleted,
            other => ClusterStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClusterStatus::Creating => "creating",
            ClusterStatus::Available => "available",
            ClusterStatus::Deleting => "deleting",
            ClusterStatus::Deleted => "deleted",
            ClusterStatus::Other(s) => s,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ClusterStatus::Available)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, ClusterStatus::Deleted)
    }
}

impl From<String> for ClusterStatus {
    fn from(s: String) -> Self {
        ClusterStatus::parse(&s)
    }
}

impl From<ClusterStatus> for String {
    fn from(s: ClusterStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClusterObservation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    #[serde(default)]
    pub port: Option<u16>,
}

/// A read-only snapshot of the cluster. Re-fetched, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterObservation {
    pub status: ClusterStatus,
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    #[serde(default)]
    pub vpc_id: Option<String>,
}

impl ClusterObservation {
    pub fn address(&self) -> Option<&str> {
        self.endpoint.as_ref().map(|e| e.address.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
