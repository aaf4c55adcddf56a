//! Blocking REST/JSON client for the provisioning control plane.
//!
//! | Operation        | Request                                      |
//! |------------------|----------------------------------------------|
//! | create role      | `POST /roles`                                |
//! | attach policy    | `POST /roles/{name}/policies/attach`         |
//! | get role         | `GET /roles/{name}`                          |
//! | detach policy    | `POST /roles/{name}/policies/detach`         |
//! | delete role      | `DELETE /roles/{name}`                       |
//! | create cluster   | `POST /clusters`                             |
//! | describe cluster | `GET /clusters/{id}`                         |
//! | delete cluster   | `DELETE /clusters/{id}`                      |
//! | default group    | `GET /networks/{id}/security-groups/default` |
//! | ingress          | `POST /security-groups/{id}/ingress`         |
//!
//! 409 is classified as "already exists", 404 as "not found".

use crate::control_plane::{
    ClusterApi, ControlPlaneError, CpResult, ErrorKind, IdentityApi, NetworkApi,
};
use crate::error::{DwhError, Result};
use crate::settings::ControlPlaneSettings;
use crate::types::{ClusterObservation, ClusterSpec, TrustRole};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const REGION_HEADER: &str = "x-region";

pub struct HttpControlPlane {
    client: Client,
    base: Url,
    settings: ControlPlaneSettings,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CreateRoleRequest<'a> {
    name: &'a str,
    path: &'a str,
    description: &'a str,
    /// JSON-encoded trust policy document.
    assume_role_policy: String,
}

#[derive(Serialize)]
struct PolicyRequest<'a> {
    policy_arn: &'a str,
}

#[derive(Deserialize)]
struct RoleResponse {
    arn: String,
}

#[derive(Serialize)]
struct CreateClusterRequest<'a> {
    cluster_id: &'a str,
    cluster_type: &'a str,
    node_type: &'a str,
    number_of_nodes: u32,
    db_name: &'a str,
    master_username: &'a str,
    master_password: &'a str,
    port: u16,
    iam_roles: Vec<&'a str>,
}

#[derive(Serialize)]
struct DeleteClusterRequest {
    skip_final_snapshot: bool,
}

#[derive(Deserialize)]
struct SecurityGroupResponse {
    group_id: String,
}

#[derive(Serialize)]
struct IngressRequest<'a> {
    protocol: &'a str,
    from_port: u16,
    to_port: u16,
    cidr: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl HttpControlPlane {
    pub fn new(settings: ControlPlaneSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.request_timeout)
            .build()
            .map_err(|e| DwhError::MalformedConfig(format!("http client: {e}")))?;
        let base = Url::parse(&settings.endpoint).map_err(|e| {
            DwhError::MalformedConfig(format!("aws.endpoint '{}': {e}", settings.endpoint))
        })?;
        if base.cannot_be_a_base() {
            return Err(DwhError::MalformedConfig(format!(
                "aws.endpoint '{}' is not a base URL",
                settings.endpoint
            )));
        }
        Ok(Self {
            client,
            base,
            settings,
        })
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send(&self, req: RequestBuilder) -> CpResult<Response> {
        let resp = req
            .basic_auth(&self.settings.access_key, Some(&self.settings.secret))
            .header(REGION_HEADER, &self.settings.region)
            .send()
            .map_err(|e| ControlPlaneError::other(format!("request failed: {e}")))?;
        let status = resp.status();
        debug!(url = %resp.url(), status = status.as_u16(), "control plane response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(classify(status, &body))
    }

    fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> CpResult<T> {
        self.send(req)?
            .json()
            .map_err(|e| ControlPlaneError::other(format!("unreadable response: {e}")))
    }
}

fn classify(status: StatusCode, body: &str) -> ControlPlaneError {
    let kind = match status {
        StatusCode::CONFLICT => ErrorKind::AlreadyExists,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        _ => ErrorKind::Other,
    };
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {message}"),
        Ok(ErrorBody {
            code: Some(text), ..
        })
        | Ok(ErrorBody {
            message: Some(text),
            ..
        }) => text,
        _ => body.chars().take(500).collect(),
    };
    ControlPlaneError::new(kind, format!("HTTP {}: {detail}", status.as_u16()))
}

impl IdentityApi for HttpControlPlane {
    fn create_role(&self, role: &TrustRole) -> CpResult<()> {
        let body = CreateRoleRequest {
            name: &role.name,
            path: &role.path,
            description: &role.description,
            assume_role_policy: role.trust_policy().to_string(),
        };
        self.send(self.client.post(self.url(&["roles"])).json(&body))?;
        Ok(())
    }

    fn attach_policy(&self, role_name: &str, policy: &str) -> CpResult<()> {
        let url = self.url(&["roles", role_name, "policies", "attach"]);
        self.send(self.client.post(url).json(&PolicyRequest { policy_arn: policy }))?;
        Ok(())
    }

    fn get_role(&self, role_name: &str) -> CpResult<String> {
        let url = self.url(&["roles", role_name]);
        let role: RoleResponse = self.send_json(self.client.get(url))?;
        Ok(role.arn)
    }

    fn detach_policy(&self, role_name: &str, policy: &str) -> CpResult<()> {
        let url = self.url(&["roles", role_name, "policies", "detach"]);
        self.send(self.client.post(url).json(&PolicyRequest { policy_arn: policy }))?;
        Ok(())
    }

    fn delete_role(&self, role_name: &str) -> CpResult<()> {
        let url = self.url(&["roles", role_name]);
        self.send(self.client.delete(url))?;
        Ok(())
    }
}

impl ClusterApi for HttpControlPlane {
    fn create_cluster(&self, spec: &ClusterSpec, role_id: &str) -> CpResult<()> {
        let body = CreateClusterRequest {
            cluster_id: &spec.id,
            cluster_type: &spec.cluster_type,
            node_type: &spec.node_type,
            number_of_nodes: spec.node_count,
            db_name: &spec.db_name,
            master_username: &spec.master_user,
            master_password: &spec.master_password,
            port: spec.port,
            iam_roles: vec![role_id],
        };
        self.send(self.client.post(self.url(&["clusters"])).json(&body))?;
        Ok(())
    }

    fn describe_cluster(&self, cluster_id: &str) -> CpResult<ClusterObservation> {
        let url = self.url(&["clusters", cluster_id]);
        self.send_json(self.client.get(url))
    }

    fn delete_cluster(&self, cluster_id: &str) -> CpResult<()> {
        let url = self.url(&["clusters", cluster_id]);
        let body = DeleteClusterRequest {
            skip_final_snapshot: true,
        };
        self.send(self.client.delete(url).json(&body))?;
        Ok(())
    }
}

impl NetworkApi for HttpControlPlane {
    fn default_security_group(&self, network_id: &str) -> CpResult<String> {
        let url = self.url(&["networks", network_id, "security-groups", "default"]);
        let group: SecurityGroupResponse = self.send_json(self.client.get(url))?;
        Ok(group.group_id)
    }

    fn authorize_ingress(
        &self,
        group_id: &str,
        protocol: &str,
        port: u16,
        cidr: &str,
    ) -> CpResult<()> {
        let url = self.url(&["security-groups", group_id, "ingress"]);
        let body = IngressRequest {
            protocol,
            from_port: port,
            to_port: port,
            cidr,
        };
        self.send(self.client.post(url).json(&body))?;
        Ok(())
    }
}
