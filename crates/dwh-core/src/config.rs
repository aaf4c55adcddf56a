use crate::error::{DwhError, Result};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Section and key names
// ---------------------------------------------------------------------------

pub mod section {
    pub const AWS: &str = "aws";
    pub const IDENTITY: &str = "identity";
    pub const CLUSTER: &str = "cluster";
    pub const DATABASE: &str = "database";
    pub const STORAGE: &str = "storage";
    pub const POLL: &str = "poll";
    pub const NETWORK: &str = "network";
}

pub mod key {
    pub const ENDPOINT: &str = "endpoint";
    pub const ACCESS_KEY: &str = "key";
    pub const SECRET: &str = "secret";
    pub const REGION: &str = "region";
    pub const REQUEST_TIMEOUT_SECS: &str = "request_timeout_secs";

    pub const ROLE_NAME: &str = "role_name";
    pub const ROLE_ID: &str = "role_id";
    pub const SERVICE_PRINCIPAL: &str = "service_principal";
    pub const ACCESS_POLICY: &str = "access_policy";

    pub const ID: &str = "id";
    pub const TYPE: &str = "type";
    pub const NODE_TYPE: &str = "node_type";
    pub const NODE_COUNT: &str = "node_count";

    pub const NAME: &str = "name";
    pub const USER: &str = "user";
    pub const PASSWORD: &str = "password";
    pub const PORT: &str = "port";

    pub const INTERVAL_SECS: &str = "interval_secs";
    pub const TIMEOUT_SECS: &str = "timeout_secs";

    pub const OPEN_INGRESS: &str = "open_ingress";
    pub const CIDR: &str = "cidr";
    pub const PROTOCOL: &str = "protocol";
}

type Sections = BTreeMap<String, BTreeMap<String, String>>;

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Durable section → key → value configuration.
///
/// Every [`set`](ConfigStore::set) and [`remove`](ConfigStore::remove) writes
/// the whole record back to disk before returning. There is no locking: one
/// writer process per file is assumed.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    sections: Sections,
}

impl ConfigStore {
    /// An empty store that will be written to `path` on the first update.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sections: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DwhError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let sections = parse_sections(&data)?;
        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        self.get_opt(section, key).ok_or_else(|| DwhError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    pub fn get_opt(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// Read and parse a required value.
    pub fn get_parsed<T>(&self, section: &str, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(section, key)?;
        parse_value(section, key, raw)
    }

    /// Read and parse an optional value, falling back to `default` when absent.
    pub fn get_parsed_or<T>(&self, section: &str, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_opt(section, key) {
            Some(raw) => parse_value(section, key, raw),
            None => Ok(default),
        }
    }

    pub fn section(&self, section: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(section)
    }

    /// Set a value and persist the whole record.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) -> Result<()> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self.save()
    }

    /// Remove a value and persist. Returns `false` when it was not present.
    pub fn remove(&mut self, section: &str, key: &str) -> Result<bool> {
        let removed = self
            .sections
            .get_mut(section)
            .and_then(|s| s.remove(key))
            .is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn save(&self) -> Result<()> {
        let data = serde_yaml::to_string(&self.sections)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }
}

fn parse_value<T>(section: &str, key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| DwhError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Hand-written files may use bare numbers and booleans; they are kept as
/// their textual form. Nulls count as absent.
fn parse_sections(data: &str) -> Result<Sections> {
    let root: Value = serde_yaml::from_str(data)?;
    let mut sections = BTreeMap::new();
    let mapping = match root {
        Value::Null => return Ok(sections),
        Value::Mapping(m) => m,
        _ => {
            return Err(DwhError::MalformedConfig(
                "top level must be a mapping of sections".into(),
            ))
        }
    };

    for (name, body) in mapping {
        let name = scalar_to_string(&name)
            .ok_or_else(|| DwhError::MalformedConfig("section names must be scalars".into()))?;
        let mut entries = BTreeMap::new();
        match body {
            Value::Null => {}
            Value::Mapping(m) => {
                for (k, v) in m {
                    let k = scalar_to_string(&k).ok_or_else(|| {
                        DwhError::MalformedConfig(format!("non-scalar key in section '{name}'"))
                    })?;
                    match v {
                        Value::Null => {}
                        other => {
                            let v = scalar_to_string(&other).ok_or_else(|| {
                                DwhError::MalformedConfig(format!(
                                    "value of '{name}.{k}' must be a scalar"
                                ))
                            })?;
                            entries.insert(k, v);
                        }
                    }
                }
            }
            _ => {
                return Err(DwhError::MalformedConfig(format!(
                    "section '{name}' must be a mapping"
                )))
            }
        }
        sections.insert(name, entries);
    }
    Ok(sections)
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
