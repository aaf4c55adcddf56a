pub mod cleanup;
pub mod init;

use anyhow::Context;
use dwh_core::http::HttpControlPlane;
use dwh_core::settings::Settings;
use dwh_core::ConfigStore;
use std::path::Path;

/// Load and validate the config, and build the control-plane client from it.
/// Nothing remote is contacted here.
pub fn open(config: &Path) -> anyhow::Result<(ConfigStore, HttpControlPlane)> {
    let store = ConfigStore::load(config)
        .with_context(|| format!("failed to load config {}", config.display()))?;
    let settings = Settings::from_store(&store).context("invalid config")?;
    let provider = HttpControlPlane::new(settings.control_plane)
        .context("failed to set up control plane client")?;
    Ok((store, provider))
}
