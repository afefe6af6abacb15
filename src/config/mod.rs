//! Configuration module for gitgraph
//!
//! This module handles:
//! - Project-level configuration (gitgraph.toml in the work tree root)
//! - Environment overrides (GITGRAPH_*)

mod project_config;

pub use project_config::{load_project_config, parse_bool, ProjectConfig, ScanConfig, StoreConfig};
