//! `fmd info` – show portal metadata and recent releases of a mod.

use anyhow::{Context as _, Result};
use fmd_core::context::Context;
use fmd_core::portal::{ModInfo, ModSource};
use std::sync::Arc;

use crate::cli::cycle;

/// Releases shown without `--all`.
const RECENT_RELEASES: usize = 6;
const WORDS_PER_LINE: usize = 10;

pub async fn run_info(ctx: Arc<Context>, input: &str, all: bool) -> Result<()> {
    let summary = cycle::lookup_mod(&ctx, input).await?;
    let name = summary.name.clone();
    let full = cycle::blocking(&ctx, move |ctx| ctx.portal().full_info(&name))
        .await?
        .with_context(|| format!("fetch releases of {}", summary.name))?;
    print_info(&summary, &full, all);
    Ok(())
}

fn print_info(summary: &ModInfo, full: &ModInfo, all: bool) {
    println!("Name:      {}", summary.display_title());
    println!("Owner:     {}", summary.owner.as_deref().unwrap_or("Unknown"));
    println!("Downloads: {}", summary.downloads_count);
    println!("ID:        {}", summary.name);
    if let Some(text) = summary.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        println!();
        for line in wrap_words(text, WORDS_PER_LINE) {
            println!("  {}", line);
        }
    }
    println!();

    // Portal lists releases oldest first.
    let releases: Vec<_> = full.releases.iter().rev().collect();
    let shown = if all {
        releases.len()
    } else {
        RECENT_RELEASES.min(releases.len())
    };
    println!("{:<50} {:<12} {}", "FILE", "VERSION", "GAME");
    for release in &releases[..shown] {
        println!(
            "{:<50} {:<12} {}",
            release.file_name,
            release.version,
            release.factorio_version().unwrap_or("Unknown")
        );
    }
    if shown < releases.len() {
        println!("... {} more (use --all)", releases.len() - shown);
    }
}

fn wrap_words(text: &str, per_line: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(per_line).map(|chunk| chunk.join(" ")).collect()
}
