//! Provisions and tears down the warehouse environment: a trust
//! role that lets the cluster read object storage, and the analytic cluster
//! itself.
//!
//! ```text
//! init:    IdentityProvisioner::ensure_role ─▶ store identity.role_id
//!          ClusterProvisioner::create (poll) ─▶ store database.endpoint
//!          NetworkConfigurer (best-effort)
//!
//! cleanup: ClusterProvisioner::delete (poll) ─▶ IdentityProvisioner::teardown_role
//! ```

pub mod cluster;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod http;
pub mod identity;
pub mod io;
pub mod network;
pub mod orchestrator;
pub mod paths;
pub mod poll;
pub mod settings;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::ConfigStore;
pub use error::{DwhError, Result};
pub use orchestrator::{CleanupReport, InitReport, LifecycleOrchestrator};
pub use poll::CancelToken;
