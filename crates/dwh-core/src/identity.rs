use crate::control_plane::IdentityApi;
use crate::error::{DwhError, Result, Step};
use crate::types::TrustRole;
use tracing::info;

/// Creates, resolves and tears down the cluster's trust role.
pub struct IdentityProvisioner<'a> {
    api: &'a dyn IdentityApi,
}

impl<'a> IdentityProvisioner<'a> {
    pub fn new(api: &'a dyn IdentityApi) -> Self {
        Self { api }
    }

    /// Make sure the role exists with its access policy attached and return
    /// its identifier. Safe to call when the role is already in place.
    pub fn ensure_role(&self, role: &TrustRole) -> Result<String> {
        match self.api.create_role(role) {
            Ok(()) => info!(role = %role.name, "role created"),
            Err(e) if e.is_already_exists() => {
                info!(role = %role.name, "role already exists");
            }
            Err(e) => return Err(DwhError::step(Step::CreateRole, e)),
        }

        match self.api.attach_policy(&role.name, &role.access_policy) {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(DwhError::step(Step::AttachPolicy, e)),
        }
        info!(role = %role.name, policy = %role.access_policy, "access policy attached");

        match self.api.get_role(&role.name) {
            Ok(id) => Ok(id),
            Err(e) if e.is_not_found() => Err(DwhError::RoleNotFound(role.name.clone())),
            Err(e) => Err(DwhError::step(Step::GetRole, e)),
        }
    }

    /// Detach the access policy and delete the role. Anything already gone
    /// counts as done.
    pub fn teardown_role(&self, role: &TrustRole) -> Result<()> {
        match self.api.detach_policy(&role.name, &role.access_policy) {
            Ok(()) => info!(role = %role.name, "access policy detached"),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(DwhError::step(Step::DetachPolicy, e)),
        }
        match self.api.delete_role(&role.name) {
            Ok(()) => info!(role = %role.name, "role deleted"),
            Err(e) if e.is_not_found() => info!(role = %role.name, "role already gone"),
            Err(e) => return Err(DwhError::step(Step::DeleteRole, e)),
        }
        Ok(())
    }
}
