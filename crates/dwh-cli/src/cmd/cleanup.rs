use crate::output::{print_json, print_pairs};
use anyhow::Context;
use dwh_core::control_plane::ControlPlane;
use dwh_core::network::BestEffort;
use dwh_core::{CancelToken, LifecycleOrchestrator};
use std::path::Path;

pub fn run(config: &Path, cancel: CancelToken, json: bool) -> anyhow::Result<()> {
    let (store, provider) = super::open(config)?;
    let mut orchestrator =
        LifecycleOrchestrator::new(store, ControlPlane::uniform(&provider), cancel)
            .context("invalid config")?;
    let report = orchestrator.cleanup().context("cleanup failed")?;

    if json {
        print_json(&report)?;
    } else {
        print_pairs(
            ("RESOURCE", "RESULT"),
            &[
                ("cluster", report.cluster.to_string()),
                ("role", report.role.to_string()),
            ],
        );
        if let BestEffort::Failed(_) = report.role {
            println!();
            println!("Cluster is gone but the role is still there; re-run cleanup to retry.");
        }
    }
    Ok(())
}
