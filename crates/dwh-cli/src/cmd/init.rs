use crate::output::{print_json, print_pairs};
use anyhow::Context;
use dwh_core::control_plane::ControlPlane;
use dwh_core::{CancelToken, LifecycleOrchestrator};
use std::path::Path;

pub fn run(config: &Path, cancel: CancelToken, json: bool) -> anyhow::Result<()> {
    let (store, provider) = super::open(config)?;
    let mut orchestrator =
        LifecycleOrchestrator::new(store, ControlPlane::uniform(&provider), cancel)
            .context("invalid config")?;
    let report = orchestrator.init().context("init failed")?;

    if json {
        print_json(&report)?;
    } else {
        print_pairs(
            ("FACT", "VALUE"),
            &[
                ("identity.role_id", report.role_id.clone()),
                ("database.endpoint", report.endpoint.clone()),
                ("ingress", report.ingress.to_string()),
            ],
        );
        println!();
        println!("Cluster is available. Facts saved to {}", config.display());
    }
    Ok(())
}
