//! `fmd import` – resolve every enabled mod of a `mod-list.json` and install the lot.

use anyhow::{bail, Result};
use fmd_core::context::{Context, Resolution};
use fmd_core::depspec::VersionFilter;
use fmd_core::modlist::ModList;
use fmd_core::resolver::{VersionSelector, VisitedSet};
use std::path::Path;
use std::sync::Arc;

use super::install::print_outcomes;
use crate::cli::cycle;

pub async fn run_import(ctx: Arc<Context>, path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("file {} not found", path.display());
    }
    let list = ModList::load(path)?;
    let mods: Vec<String> = list.enabled_mods().into_iter().map(str::to_string).collect();
    println!("Found {} enabled mods.", mods.len());

    // One visited set across all roots: shared dependencies are fetched once.
    let worker_ctx = Arc::clone(&ctx);
    let resolution = cycle::run_blocking(move |cancel| {
        let mut resolver = worker_ctx.resolver(cancel);
        let mut visited = VisitedSet::new();
        for name in &mods {
            resolver.resolve(name, &VersionSelector::Latest, &VersionFilter::Any, &mut visited)?;
        }
        Ok(Resolution {
            visited,
            report: resolver.into_report(),
        })
    })
    .await?;
    cycle::print_report(&resolution);

    let Some(installer) = ctx.installer() else {
        println!(
            "Factorio path not set; files are in {}",
            ctx.cache_dir().display()
        );
        return Ok(());
    };
    let list_path = path.to_path_buf();
    let (outcomes, copied) = tokio::task::spawn_blocking(move || {
        let outcomes = installer.install_set(&resolution.visited);
        let copied = installer.install_mod_list(&list_path);
        (outcomes, copied)
    })
    .await?;
    print_outcomes(&outcomes);
    let target = copied?;
    println!("Updated {}", target.display());
    Ok(())
}
