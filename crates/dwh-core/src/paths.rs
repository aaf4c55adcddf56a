use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "dwh.yaml";

/// Resolve the configuration file.
///
/// Priority:
/// 1. `--config` flag / `DWH_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `start` looking for `dwh.yaml`
/// 3. Fall back to `start/dwh.yaml`
pub fn resolve_config(explicit: Option<&Path>, start: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return candidate;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    start.join(CONFIG_FILE)
}
