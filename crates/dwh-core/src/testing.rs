//! In-memory control plane for unit tests.

use crate::control_plane::{ClusterApi, ControlPlaneError, CpResult, IdentityApi, NetworkApi};
use crate::types::{ClusterObservation, ClusterSpec, ClusterStatus, Endpoint, TrustRole};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

struct FakeCluster {
    status: ClusterStatus,
    polls_left: u32,
    port: u16,
}

type Hook = Box<dyn FnMut()>;

pub(crate) struct FakeCloud {
    pub roles: RefCell<BTreeMap<String, BTreeSet<String>>>,
    clusters: RefCell<BTreeMap<String, FakeCluster>>,
    /// Describes that report `creating` after a fresh create.
    pub creating_polls: Cell<u32>,
    /// Describes that report `deleting` after a delete request.
    pub deleting_polls: Cell<u32>,
    /// Keep answering for a deleted cluster with a `deleted` status instead
    /// of NotFound.
    pub report_deleted: Cell<bool>,
    /// Describes that report `available` without an endpoint.
    pub addressless_polls: Cell<u32>,
    pub endpoint: String,
    pub vpc_id: Option<String>,
    calls: RefCell<Vec<&'static str>>,
    failures: RefCell<BTreeMap<&'static str, ControlPlaneError>>,
    before_create_cluster: RefCell<Option<Hook>>,
    pub ingress: RefCell<Vec<(String, String, u16, String)>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self {
            roles: RefCell::new(BTreeMap::new()),
            clusters: RefCell::new(BTreeMap::new()),
            creating_polls: Cell::new(0),
            deleting_polls: Cell::new(0),
            report_deleted: Cell::new(false),
            addressless_polls: Cell::new(0),
            endpoint: "dwh.example.internal".to_string(),
            vpc_id: Some("vpc-0abc".to_string()),
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(BTreeMap::new()),
            before_create_cluster: RefCell::new(None),
            ingress: RefCell::new(Vec::new()),
        }
    }

    /// Make every call to `op` fail with `err`.
    pub fn fail(&self, op: &'static str, err: ControlPlaneError) {
        self.failures.borrow_mut().insert(op, err);
    }

    pub fn on_create_cluster(&self, hook: impl FnMut() + 'static) {
        *self.before_create_cluster.borrow_mut() = Some(Box::new(hook));
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == op).count()
    }

    pub fn has_cluster(&self, id: &str) -> bool {
        self.clusters.borrow().contains_key(id)
    }

    /// Seed a cluster that is already up.
    pub fn seed_available_cluster(&self, id: &str) {
        self.clusters.borrow_mut().insert(
            id.to_string(),
            FakeCluster {
                status: ClusterStatus::Available,
                polls_left: 0,
                port: 5439,
            },
        );
    }

    fn enter(&self, op: &'static str) -> CpResult<()> {
        self.calls.borrow_mut().push(op);
        match self.failures.borrow().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl IdentityApi for FakeCloud {
    fn create_role(&self, role: &TrustRole) -> CpResult<()> {
        self.enter("create_role")?;
        let mut roles = self.roles.borrow_mut();
        if roles.contains_key(&role.name) {
            return Err(ControlPlaneError::already_exists(format!(
                "role {} already exists",
                role.name
            )));
        }
        roles.insert(role.name.clone(), BTreeSet::new());
        Ok(())
    }

    fn attach_policy(&self, role_name: &str, policy: &str) -> CpResult<()> {
        self.enter("attach_policy")?;
        let mut roles = self.roles.borrow_mut();
        let attached = roles
            .get_mut(role_name)
            .ok_or_else(|| ControlPlaneError::not_found(format!("no role {role_name}")))?;
        attached.insert(policy.to_string());
        Ok(())
    }

    fn get_role(&self, role_name: &str) -> CpResult<String> {
        self.enter("get_role")?;
        if self.roles.borrow().contains_key(role_name) {
            Ok(format!("arn:role/{role_name}"))
        } else {
            Err(ControlPlaneError::not_found(format!("no role {role_name}")))
        }
    }

    fn detach_policy(&self, role_name: &str, policy: &str) -> CpResult<()> {
        self.enter("detach_policy")?;
        let mut roles = self.roles.borrow_mut();
        let attached = roles
            .get_mut(role_name)
            .ok_or_else(|| ControlPlaneError::not_found(format!("no role {role_name}")))?;
        if !attached.remove(policy) {
            return Err(ControlPlaneError::not_found(format!(
                "{policy} not attached to {role_name}"
            )));
        }
        Ok(())
    }

    fn delete_role(&self, role_name: &str) -> CpResult<()> {
        self.enter("delete_role")?;
        let mut roles = self.roles.borrow_mut();
        match roles.get(role_name) {
            None => Err(ControlPlaneError::not_found(format!("no role {role_name}"))),
            Some(attached) if !attached.is_empty() => Err(ControlPlaneError::other(format!(
                "role {role_name} still has policies attached"
            ))),
            Some(_) => {
                roles.remove(role_name);
                Ok(())
            }
        }
    }
}

impl ClusterApi for FakeCloud {
    fn create_cluster(&self, spec: &ClusterSpec, role_id: &str) -> CpResult<()> {
        self.enter("create_cluster")?;
        if let Some(hook) = self.before_create_cluster.borrow_mut().as_mut() {
            hook();
        }
        let role_name = role_id.rsplit('/').next().unwrap_or(role_id);
        let policy_attached = self
            .roles
            .borrow()
            .get(role_name)
            .is_some_and(|p| !p.is_empty());
        if !policy_attached {
            return Err(ControlPlaneError::other(format!(
                "role {role_id} is not usable by the cluster"
            )));
        }
        let mut clusters = self.clusters.borrow_mut();
        if clusters.contains_key(&spec.id) {
            return Err(ControlPlaneError::already_exists(format!(
                "cluster {} already exists",
                spec.id
            )));
        }
        clusters.insert(
            spec.id.clone(),
            FakeCluster {
                status: ClusterStatus::Creating,
                polls_left: self.creating_polls.get(),
                port: spec.port,
            },
        );
        Ok(())
    }

    fn describe_cluster(&self, cluster_id: &str) -> CpResult<ClusterObservation> {
        self.enter("describe_cluster")?;
        let mut clusters = self.clusters.borrow_mut();
        let gone = match clusters.get(cluster_id) {
            None => true,
            Some(c) => {
                c.status == ClusterStatus::Deleting
                    && c.polls_left == 0
                    && !self.report_deleted.get()
            }
        };
        if gone {
            clusters.remove(cluster_id);
            return Err(ControlPlaneError::not_found(format!("no cluster {cluster_id}")));
        }
        let Some(cluster) = clusters.get_mut(cluster_id) else {
            return Err(ControlPlaneError::not_found(format!("no cluster {cluster_id}")));
        };
        match cluster.status {
            ClusterStatus::Creating if cluster.polls_left == 0 => {
                cluster.status = ClusterStatus::Available;
            }
            ClusterStatus::Deleting if cluster.polls_left == 0 => {
                cluster.status = ClusterStatus::Deleted;
            }
            ClusterStatus::Creating | ClusterStatus::Deleting => cluster.polls_left -= 1,
            _ => {}
        }
        let available = cluster.status.is_available();
        let addressless = available && self.addressless_polls.get() > 0;
        if addressless {
            self.addressless_polls.set(self.addressless_polls.get() - 1);
        }
        Ok(ClusterObservation {
            status: cluster.status.clone(),
            endpoint: (available && !addressless).then(|| Endpoint {
                address: self.endpoint.clone(),
                port: Some(cluster.port),
            }),
            vpc_id: if available { self.vpc_id.clone() } else { None },
        })
    }

    fn delete_cluster(&self, cluster_id: &str) -> CpResult<()> {
        self.enter("delete_cluster")?;
        let mut clusters = self.clusters.borrow_mut();
        let Some(cluster) = clusters.get_mut(cluster_id) else {
            return Err(ControlPlaneError::not_found(format!("no cluster {cluster_id}")));
        };
        cluster.status = ClusterStatus::Deleting;
        cluster.polls_left = self.deleting_polls.get();
        Ok(())
    }
}

impl NetworkApi for FakeCloud {
    fn default_security_group(&self, network_id: &str) -> CpResult<String> {
        self.enter("default_security_group")?;
        Ok(format!("sg-{network_id}"))
    }

    fn authorize_ingress(
        &self,
        group_id: &str,
        protocol: &str,
        port: u16,
        cidr: &str,
    ) -> CpResult<()> {
        self.enter("authorize_ingress")?;
        let rule = (
            group_id.to_string(),
            protocol.to_string(),
            port,
            cidr.to_string(),
        );
        let mut ingress = self.ingress.borrow_mut();
        if ingress.contains(&rule) {
            return Err(ControlPlaneError::already_exists("rule already present"));
        }
        ingress.push(rule);
        Ok(())
    }
}

pub(crate) fn cluster_spec() -> ClusterSpec {
    ClusterSpec {
        id: "dwhCluster".to_string(),
        cluster_type: "multi-node".to_string(),
        node_type: "dc2.large".to_string(),
        node_count: 4,
        db_name: "dwh".to_string(),
        master_user: "dwhuser".to_string(),
        master_password: "Passw0rd".to_string(),
        port: 5439,
    }
}
