//! Scan command - ingest history into the graph database

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use tracing::error;

use gitgraph::graph::GraphStore;
use gitgraph::ingest::{scan_repository, ScanStats};

use super::{locate_targets, Target};

pub fn run(path: &Path, range: Option<String>, db: Option<PathBuf>, submodules: bool) -> Result<()> {
    let (config, targets) = locate_targets(path, db, submodules)?;
    let range = range.or_else(|| config.range().map(str::to_string));

    let mut failed = Vec::new();
    for target in &targets {
        if let Err(e) = scan_target(target, range.as_deref()) {
            error!("{:#}", e);
            failed.push(target.located.name.clone());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} repositories failed to scan: {}",
            failed.len(),
            targets.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

/// Scan one repository and persist the result.
///
/// The store is only saved when the scan succeeded, so a failed scan leaves
/// the database as it was.
fn scan_target(target: &Target, range: Option<&str>) -> Result<()> {
    let name = &target.located.name;
    let store = GraphStore::new(&target.db_path)
        .with_context(|| format!("Failed to open graph database {}", target.db_path.display()))?;

    let stats = scan_repository(&store, &target.located, range)
        .with_context(|| format!("Scan of '{}' failed", name))?;

    store
        .save()
        .with_context(|| format!("Failed to save graph database {}", target.db_path.display()))?;

    print_summary(name, &target.db_path, &stats);
    Ok(())
}

fn print_summary(name: &str, db_path: &Path, stats: &ScanStats) {
    println!("\n{} {}", style("Scanned").green().bold(), style(name).cyan());
    println!(
        "  Range:      {}",
        stats.effective_range.as_deref().unwrap_or("full history")
    );
    println!("  Walked:     {} commits", stats.commits_walked);
    println!(
        "  Created:    {} commits, {} authors, {} committers, {} files, {} branches, {} tags",
        style(stats.commits_created).cyan(),
        stats.authors_created,
        stats.committers_created,
        stats.files_created,
        stats.branches_created,
        stats.tags_created
    );
    println!(
        "  Recorded:   {} changes, {} parent edges",
        stats.changes_created, stats.parent_edges
    );
    if stats.gaps > 0 {
        println!(
            "  {} {} references outside the scanned range",
            style("[!!]").yellow(),
            stats.gaps
        );
    }
    println!("  Database:   {}", style(db_path.display()).dim());
}
