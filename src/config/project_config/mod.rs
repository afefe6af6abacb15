//! Project-level configuration
//!
//! Loaded from `gitgraph.toml` in the work tree root, then overridden by
//! environment variables. CLI flags are applied on top by the caller.
//!
//! ```toml
//! [scan]
//! range = "v1.0.."
//! scan_submodules = true
//!
//! [store]
//! path = "/var/lib/gitgraph"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "gitgraph.toml";

pub const ENV_RANGE: &str = "GITGRAPH_RANGE";
pub const ENV_SCAN_SUBMODULES: &str = "GITGRAPH_SCAN_SUBMODULES";
pub const ENV_DB: &str = "GITGRAPH_DB";

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// `[scan]` section
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Default range expression, e.g. `v1.0..`
    #[serde(default)]
    pub range: Option<String>,

    /// Also scan initialized submodules
    #[serde(default)]
    pub scan_submodules: Option<bool>,
}

/// `[store]` section
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Graph database directory; defaults to the per-repository cache dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl ProjectConfig {
    pub fn scan_submodules(&self) -> bool {
        self.scan.scan_submodules.unwrap_or(false)
    }

    /// Range to scan, `None` for the whole history
    pub fn range(&self) -> Option<&str> {
        self.scan
            .range
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Apply `GITGRAPH_*` overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(range) = lookup(ENV_RANGE) {
            self.scan.range = Some(range);
        }
        if let Some(value) = lookup(ENV_SCAN_SUBMODULES) {
            match parse_bool(&value) {
                Some(flag) => self.scan.scan_submodules = Some(flag),
                None => warn!("Ignoring {}={}: expected true or false", ENV_SCAN_SUBMODULES, value),
            }
        }
        if let Some(path) = lookup(ENV_DB).filter(|p| !p.trim().is_empty()) {
            self.store.path = Some(PathBuf::from(path));
        }
    }
}

/// `true`/`false`/`1`/`0`/`yes`/`no`, case-insensitive
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load the project configuration for a work tree.
///
/// A missing file gives the defaults; a malformed one is reported and ignored.
/// Environment variables are applied afterwards.
pub fn load_project_config(repo_path: &Path) -> ProjectConfig {
    let mut config = load_file_config(repo_path);
    config.apply_env(|name| std::env::var(name).ok());
    config
}

fn load_file_config(repo_path: &Path) -> ProjectConfig {
    let toml_path = repo_path.join(CONFIG_FILE);
    if !toml_path.exists() {
        return ProjectConfig::default();
    }

    match load_toml_config(&toml_path) {
        Ok(config) => {
            debug!("Loaded project config from {}", toml_path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", toml_path.display(), e);
            ProjectConfig::default()
        }
    }
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}
