//! The two top-level operations: bring the environment up, tear it down.
//!
//! Both are re-entrant. Steps that already happened are recognised through
//! the control plane's "already exists" / "not found" answers, so re-running
//! after a partial failure converges instead of duplicating resources. Nothing
//! is rolled back; every fact is checkpointed to the [`ConfigStore`] as soon
//! as it is known.

use crate::cluster::{ClusterProvisioner, DeleteOutcome};
use crate::config::{key, section, ConfigStore};
use crate::control_plane::ControlPlane;
use crate::error::Result;
use crate::identity::IdentityProvisioner;
use crate::network::{BestEffort, NetworkConfigurer};
use crate::poll::CancelToken;
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub role_id: String,
    pub endpoint: String,
    pub ingress: BestEffort,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub cluster: DeleteOutcome,
    pub role: BestEffort,
    pub finished_at: DateTime<Utc>,
}

pub struct LifecycleOrchestrator<'a> {
    store: ConfigStore,
    settings: Settings,
    control_plane: ControlPlane<'a>,
    cancel: CancelToken,
}

impl<'a> LifecycleOrchestrator<'a> {
    /// Fails on configuration problems before touching the control plane.
    pub fn new(
        store: ConfigStore,
        control_plane: ControlPlane<'a>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let settings = Settings::from_store(&store)?;
        Ok(Self {
            store,
            settings,
            control_plane,
            cancel,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn into_store(self) -> ConfigStore {
        self.store
    }

    fn clusters(&self) -> ClusterProvisioner<'_> {
        ClusterProvisioner::new(self.control_plane.clusters, self.settings.poll, &self.cancel)
    }

    pub fn init(&mut self) -> Result<InitReport> {
        info!(role = %self.settings.role.name, cluster = %self.settings.cluster.id, "initializing");

        let role_id = IdentityProvisioner::new(self.control_plane.identity)
            .ensure_role(&self.settings.role)?;
        self.store.set(section::IDENTITY, key::ROLE_ID, role_id.as_str())?;
        info!(role_id = %role_id, "role id recorded");

        let observation = self.clusters().create(&self.settings.cluster, &role_id)?;
        let endpoint = observation
            .address()
            .map(str::to_string)
            .unwrap_or_default();
        self.store.set(section::DATABASE, key::ENDPOINT, endpoint.as_str())?;
        info!(endpoint = %endpoint, "cluster endpoint recorded");

        let ingress = if self.settings.network.open_ingress {
            NetworkConfigurer::new(self.control_plane.network)
                .open_ingress(&observation, &self.settings.ingress_rule())
        } else {
            BestEffort::Skipped("network.open_ingress is off".to_string())
        };

        Ok(InitReport {
            role_id,
            endpoint,
            ingress,
            finished_at: Utc::now(),
        })
    }

    /// Remove the cluster, then the role. Role teardown is best-effort: its
    /// failure is reported in the result, not raised.
    pub fn cleanup(&mut self) -> Result<CleanupReport> {
        info!(cluster = %self.settings.cluster.id, "cleaning up");

        let cluster = self.clusters().delete(&self.settings.cluster.id)?;
        self.store.remove(section::DATABASE, key::ENDPOINT)?;

        let role = match IdentityProvisioner::new(self.control_plane.identity)
            .teardown_role(&self.settings.role)
        {
            Ok(()) => {
                self.store.remove(section::IDENTITY, key::ROLE_ID)?;
                BestEffort::Done
            }
            Err(e) => {
                warn!(role = %self.settings.role.name, error = %e, "role teardown failed");
                BestEffort::Failed(e.to_string())
            }
        };

        Ok(CleanupReport {
            cluster,
            role,
            finished_at: Utc::now(),
        })
    }
}
