//! Status command - show what has been ingested

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

use gitgraph::graph::{branch_heads, stats, GraphStore};

use super::locate_targets;

/// Run the status command
pub fn run(path: &Path, db: Option<PathBuf>) -> Result<()> {
    let (_, targets) = locate_targets(path, db, false)?;

    println!("\ngitgraph Status\n");

    for target in &targets {
        println!("  Repository: {}", style(&target.located.name).cyan());
        println!("  Database:   {}", style(target.db_path.display()).dim());

        if !target.db_path.join("graph.redb").exists() {
            println!(
                "  {} Not scanned yet. Run {}\n",
                style("[--]").dim(),
                style("gitgraph scan").cyan()
            );
            continue;
        }

        let store = GraphStore::new(&target.db_path).with_context(|| {
            format!("Failed to open graph database {}", target.db_path.display())
        })?;

        println!();
        for (label, count) in stats(&store) {
            println!("    {:<12} {}", label, style(count).cyan());
        }

        let heads = branch_heads(&store);
        if !heads.is_empty() {
            println!("\n  Branches:");
            for (name, head) in heads {
                match head {
                    Some(sha) => println!("    {:<24} {}", name, style(sha).dim()),
                    None => println!("    {:<24} {}", name, style("(head not ingested)").yellow()),
                }
            }
        }
        println!();
    }

    Ok(())
}
