use crate::control_plane::ClusterApi;
use crate::error::{DwhError, Result, Step};
use crate::poll::{CancelToken, PollSettings, Poller};
use crate::types::{ClusterObservation, ClusterSpec};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// How a delete request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The cluster existed and has now disappeared.
    Deleted,
    /// The control plane had no such cluster when asked to delete it.
    AlreadyAbsent,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeleteOutcome::Deleted => "deleted",
            DeleteOutcome::AlreadyAbsent => "already absent",
        })
    }
}

/// Drives a cluster through `Absent → Creating → Available → Deleting → Absent`
/// by issuing requests and polling the control plane.
pub struct ClusterProvisioner<'a> {
    api: &'a dyn ClusterApi,
    poll: PollSettings,
    cancel: &'a CancelToken,
}

impl<'a> ClusterProvisioner<'a> {
    pub fn new(api: &'a dyn ClusterApi, poll: PollSettings, cancel: &'a CancelToken) -> Self {
        Self { api, poll, cancel }
    }

    /// Request the cluster and wait until it is available. Returns the
    /// observation that reported `available`, which carries the endpoint.
    pub fn create(&self, spec: &ClusterSpec, role_id: &str) -> Result<ClusterObservation> {
        match self.api.create_cluster(spec, role_id) {
            Ok(()) => info!(
                cluster = %spec.id,
                node_type = %spec.node_type,
                nodes = spec.node_count,
                "cluster requested"
            ),
            Err(e) if e.is_already_exists() => {
                info!(cluster = %spec.id, "cluster already exists");
            }
            Err(e) => return Err(DwhError::step(Step::CreateCluster, e)),
        }
        self.wait_until_available(&spec.id)
    }

    fn wait_until_available(&self, cluster_id: &str) -> Result<ClusterObservation> {
        let what = format!("cluster {cluster_id} to become available");
        Poller::new(self.poll, self.cancel).until(&what, || {
            let obs = self
                .api
                .describe_cluster(cluster_id)
                .map_err(|e| DwhError::step(Step::DescribeCluster, e))?;
            debug!(cluster = %cluster_id, status = %obs.status, "observed");
            if !obs.status.is_available() {
                return Ok(None);
            }
            // Available without an address is a control-plane glitch; keep polling.
            Ok(obs.address().is_some().then_some(obs))
        })
    }

    /// Request deletion and wait until the control plane no longer knows the
    /// cluster.
    pub fn delete(&self, cluster_id: &str) -> Result<DeleteOutcome> {
        match self.api.delete_cluster(cluster_id) {
            Ok(()) => info!(cluster = %cluster_id, "cluster deletion requested"),
            Err(e) if e.is_not_found() => {
                info!(cluster = %cluster_id, "cluster already absent");
                return Ok(DeleteOutcome::AlreadyAbsent);
            }
            Err(e) => return Err(DwhError::step(Step::DeleteCluster, e)),
        }

        let what = format!("cluster {cluster_id} to be deleted");
        Poller::new(self.poll, self.cancel).until(&what, || {
            match self.api.describe_cluster(cluster_id) {
                Ok(obs) if obs.status.is_deleted() => Ok(Some(DeleteOutcome::Deleted)),
                Ok(obs) => {
                    debug!(cluster = %cluster_id, status = %obs.status, "observed");
                    Ok(None)
                }
                Err(e) if e.is_not_found() => Ok(Some(DeleteOutcome::Deleted)),
                Err(e) => Err(DwhError::step(Step::DescribeCluster, e)),
            }
        })
    }
}
