//! Typed, validated view over the [`ConfigStore`].
//!
//! Building [`Settings`] reads every required input up front, so a missing
//! or malformed key is reported before any remote call is made.

use crate::config::{key, section, ConfigStore};
use crate::error::{DwhError, Result};
use crate::network::IngressRule;
use crate::poll::{PollSettings, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
use crate::types::{ClusterSpec, TrustRole, DEFAULT_ACCESS_POLICY, DEFAULT_SERVICE_PRINCIPAL};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CIDR: &str = "0.0.0.0/0";
pub const DEFAULT_PROTOCOL: &str = "tcp";

#[derive(Clone)]
pub struct ControlPlaneSettings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for ControlPlaneSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlaneSettings")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NetworkSettings {
    pub open_ingress: bool,
    pub cidr: String,
    pub protocol: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub control_plane: ControlPlaneSettings,
    pub role: TrustRole,
    pub cluster: ClusterSpec,
    pub poll: PollSettings,
    pub network: NetworkSettings,
}

impl Settings {
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let control_plane = ControlPlaneSettings {
            endpoint: store.get(section::AWS, key::ENDPOINT)?.to_string(),
            region: store
                .get_opt(section::AWS, key::REGION)
                .unwrap_or(DEFAULT_REGION)
                .to_string(),
            access_key: store.get(section::AWS, key::ACCESS_KEY)?.to_string(),
            secret: store.get(section::AWS, key::SECRET)?.to_string(),
            request_timeout: Duration::from_secs(store.get_parsed_or(
                section::AWS,
                key::REQUEST_TIMEOUT_SECS,
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )?),
        };

        let mut role = TrustRole::new(required_name(store, section::IDENTITY, key::ROLE_NAME)?);
        role.service_principal = store
            .get_opt(section::IDENTITY, key::SERVICE_PRINCIPAL)
            .unwrap_or(DEFAULT_SERVICE_PRINCIPAL)
            .to_string();
        role.access_policy = store
            .get_opt(section::IDENTITY, key::ACCESS_POLICY)
            .unwrap_or(DEFAULT_ACCESS_POLICY)
            .to_string();

        let node_count: u32 = store.get_parsed(section::CLUSTER, key::NODE_COUNT)?;
        if node_count == 0 {
            return Err(DwhError::InvalidValue {
                section: section::CLUSTER.into(),
                key: key::NODE_COUNT.into(),
                reason: "must be at least 1".into(),
            });
        }

        let cluster = ClusterSpec {
            id: required_name(store, section::CLUSTER, key::ID)?,
            cluster_type: store.get(section::CLUSTER, key::TYPE)?.to_string(),
            node_type: store.get(section::CLUSTER, key::NODE_TYPE)?.to_string(),
            node_count,
            db_name: store.get(section::DATABASE, key::NAME)?.to_string(),
            master_user: store.get(section::DATABASE, key::USER)?.to_string(),
            master_password: store.get(section::DATABASE, key::PASSWORD)?.to_string(),
            port: store.get_parsed(section::DATABASE, key::PORT)?,
        };

        let poll = PollSettings {
            interval: Duration::from_secs(store.get_parsed_or(
                section::POLL,
                key::INTERVAL_SECS,
                DEFAULT_INTERVAL.as_secs(),
            )?),
            timeout: Duration::from_secs(store.get_parsed_or(
                section::POLL,
                key::TIMEOUT_SECS,
                DEFAULT_TIMEOUT.as_secs(),
            )?),
        };

        let network = NetworkSettings {
            open_ingress: store.get_parsed_or(section::NETWORK, key::OPEN_INGRESS, false)?,
            cidr: store
                .get_opt(section::NETWORK, key::CIDR)
                .unwrap_or(DEFAULT_CIDR)
                .to_string(),
            protocol: store
                .get_opt(section::NETWORK, key::PROTOCOL)
                .unwrap_or(DEFAULT_PROTOCOL)
                .to_string(),
        };

        Ok(Self {
            control_plane,
            role,
            cluster,
            poll,
            network,
        })
    }

    pub fn ingress_rule(&self) -> IngressRule {
        IngressRule {
            protocol: self.network.protocol.clone(),
            port: self.cluster.port,
            cidr: self.network.cidr.clone(),
        }
    }
}

/// Identifiers end up in URL paths; reject blanks and separators early.
fn required_name(store: &ConfigStore, sec: &str, k: &str) -> Result<String> {
    let raw = store.get(sec, k)?.trim();
    if raw.is_empty() || raw.contains('/') || raw.chars().any(char::is_whitespace) {
        return Err(DwhError::InvalidValue {
            section: sec.to_string(),
            key: k.to_string(),
            reason: format!("'{raw}' is not a valid identifier"),
        });
    }
    Ok(raw.to_string())
}
