//! Clean command - remove graph databases

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::locate_targets;

pub fn run(path: &Path, db: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let (_, targets) = locate_targets(path, db, false)?;

    let found: Vec<&Path> = targets
        .iter()
        .map(|t| t.db_path.as_path())
        .filter(|p| p.exists())
        .collect();

    if found.is_empty() {
        println!("No graph database found.");
        return Ok(());
    }

    println!(
        "Found {} graph database{}:",
        found.len(),
        if found.len() == 1 { "" } else { "s" }
    );
    for dir in &found {
        println!("  {}", dir.display());
    }

    if dry_run {
        println!("\nDry run - nothing removed. Run without --dry-run to delete.");
        return Ok(());
    }

    println!();
    for dir in &found {
        match std::fs::remove_dir_all(dir) {
            Ok(_) => println!("Removed: {}", dir.display()),
            Err(e) => eprintln!("Failed to remove {}: {}", dir.display(), e),
        }
    }

    Ok(())
}
