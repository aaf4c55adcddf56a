use crate::control_plane::NetworkApi;
use crate::error::{DwhError, Step};
use crate::types::ClusterObservation;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Result of a step whose failure must never fail the surrounding operation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum BestEffort {
    Done,
    Skipped(String),
    Failed(String),
}

impl BestEffort {
    pub fn is_done(&self) -> bool {
        matches!(self, BestEffort::Done)
    }
}

impl fmt::Display for BestEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestEffort::Done => f.write_str("done"),
            BestEffort::Skipped(reason) => write!(f, "skipped ({reason})"),
            BestEffort::Failed(err) => write!(f, "failed ({err})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    pub protocol: String,
    pub port: u16,
    pub cidr: String,
}

/// Opens the database port on the cluster network's default security group.
pub struct NetworkConfigurer<'a> {
    api: &'a dyn NetworkApi,
}

impl<'a> NetworkConfigurer<'a> {
    pub fn new(api: &'a dyn NetworkApi) -> Self {
        Self { api }
    }

    pub fn open_ingress(&self, cluster: &ClusterObservation, rule: &IngressRule) -> BestEffort {
        let Some(network_id) = cluster.vpc_id.as_deref() else {
            return BestEffort::Skipped("cluster reports no network".to_string());
        };

        let group = match self.api.default_security_group(network_id) {
            Ok(g) => g,
            Err(e) => {
                let e = DwhError::step(Step::GetSecurityGroup, e);
                warn!(network = %network_id, error = %e, "could not open ingress");
                return BestEffort::Failed(e.to_string());
            }
        };

        match self
            .api
            .authorize_ingress(&group, &rule.protocol, rule.port, &rule.cidr)
        {
            Ok(()) => {
                info!(group = %group, port = rule.port, cidr = %rule.cidr, "ingress opened");
                BestEffort::Done
            }
            Err(e) if e.is_already_exists() => {
                info!(group = %group, port = rule.port, "ingress already open");
                BestEffort::Done
            }
            Err(e) => {
                let e = DwhError::step(Step::AuthorizeIngress, e);
                warn!(group = %group, error = %e, "could not open ingress");
                BestEffort::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::ControlPlaneError;
    use crate::testing::FakeCloud;
    use crate::types::{ClusterStatus, Endpoint};

    fn observation(vpc: Option<&str>) -> ClusterObservation {
        ClusterObservation {
            status: ClusterStatus::Available,
            endpoint: Some(Endpoint {
                address: "dwh.example.internal".into(),
                port: Some(5439),
            }),
            vpc_id: vpc.map(str::to_string),
        }
    }

    fn rule() -> IngressRule {
        IngressRule {
            protocol: "tcp".into(),
            port: 5439,
            cidr: "0.0.0.0/0".into(),
        }
    }

    #[test]
    fn opens_port_on_default_group() {
        let cloud = FakeCloud::new();
        let outcome =
            NetworkConfigurer::new(&cloud).open_ingress(&observation(Some("vpc-1")), &rule());
        assert_eq!(outcome, BestEffort::Done);
        assert_eq!(
            cloud.ingress.borrow()[0],
            ("sg-vpc-1".to_string(), "tcp".to_string(), 5439, "0.0.0.0/0".to_string())
        );
    }

    #[test]
    fn existing_rule_counts_as_done() {
        let cloud = FakeCloud::new();
        let configurer = NetworkConfigurer::new(&cloud);
        assert!(configurer.open_ingress(&observation(Some("vpc-1")), &rule()).is_done());
        assert!(configurer.open_ingress(&observation(Some("vpc-1")), &rule()).is_done());
        assert_eq!(cloud.ingress.borrow().len(), 1);
    }

    #[test]
    fn failures_are_reported_not_raised() {
        let cloud = FakeCloud::new();
        cloud.fail("authorize_ingress", ControlPlaneError::other("UnauthorizedOperation"));
        let outcome =
            NetworkConfigurer::new(&cloud).open_ingress(&observation(Some("vpc-1")), &rule());
        let BestEffort::Failed(message) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(message.contains("UnauthorizedOperation"));
    }

    #[test]
    fn missing_network_is_skipped() {
        let cloud = FakeCloud::new();
        let outcome = NetworkConfigurer::new(&cloud).open_ingress(&observation(None), &rule());
        assert!(matches!(outcome, BestEffort::Skipped(_)));
        assert_eq!(cloud.calls("default_security_group"), 0);
    }
}
