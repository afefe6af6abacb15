//! Where graph databases live when no `--db` is given
//!
//! Every repository gets `<cache>/gitgraph/<name>-<hash>/graph_db`, keyed by
//! its canonical path so the same checkout always maps to the same database.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gitgraph";
const DB_DIR: &str = "graph_db";
const MAX_NAME_CHARS: usize = 20;

/// Per-repository directory under the user cache dir
/// (`%LOCALAPPDATA%` on Windows, `~/.cache` when no cache dir is known).
pub fn get_cache_dir(repo_path: &Path) -> PathBuf {
    let local_app_data = if cfg!(windows) {
        std::env::var("LOCALAPPDATA").map(PathBuf::from).ok()
    } else {
        None
    };
    let base = local_app_data
        .or_else(dirs::cache_dir)
    .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
    .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR).join(repository_dir_name(repo_path))
}

/// Default graph database directory of a repository
pub fn get_graph_db_path(repo_path: &Path) -> PathBuf {
    get_cache_dir(repo_path).join(DB_DIR)
}

/// `<name>-<hash>`: a readable prefix plus a hash of the canonical path, so
/// `.` and the absolute path of a checkout agree.
fn repository_dir_name(repo_path: &Path) -> String {
    let canonical = repo_path
        .canonicalize()
        .unwrap_or_else(|_| repo_path.to_path_buf());

    let mut hasher = DefaultHasher::new();
    canonical.to_string_lossy().hash(&mut hasher);

    let name: String = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .take(MAX_NAME_CHARS)
        .collect();

    format!("{}-{:012x}", name, hasher.finish())
}
