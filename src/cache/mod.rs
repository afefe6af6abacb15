//! Per-repository cache directories

pub mod paths;

pub use paths::{get_cache_dir, get_graph_db_path};
