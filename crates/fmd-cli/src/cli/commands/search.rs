//! `fmd search` – fuzzy name search over the portal catalog.

use anyhow::Result;
use fmd_core::context::Context;
use std::sync::Arc;

use crate::cli::cycle;

pub async fn run_search(ctx: Arc<Context>, query: &str, limit: usize) -> Result<()> {
    let q = query.to_lowercase();
    let hits = cycle::blocking(&ctx, move |ctx| ctx.portal().search(&q, limit)).await??;
    if hits.is_empty() {
        println!("No mods in catalog.");
        return Ok(());
    }
    for hit in hits {
        println!(
            "{:>4.0}%  {:<40} {}",
            hit.score * 100.0,
            hit.name,
            hit.title.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
