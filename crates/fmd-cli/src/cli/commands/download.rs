//! `fmd download` – resolve a mod and fetch its dependency closure into the cache.

use anyhow::{bail, Result};
use fmd_core::context::{Context, Resolution};
use fmd_core::resolver::VersionSelector;
use std::sync::Arc;

use crate::cli::cycle;

pub async fn run_download(ctx: Arc<Context>, input: &str, version: Option<&str>) -> Result<()> {
    let resolution = fetch_closure(&ctx, input, version).await?;
    println!("Files are in {}", ctx.cache_dir().display());
    if resolution.visited.resolved_count() == 0 {
        bail!("nothing could be downloaded");
    }
    Ok(())
}

/// Look up `input`, resolve it with its dependencies and print the report.
pub(super) async fn fetch_closure(
    ctx: &Arc<Context>,
    input: &str,
    version: Option<&str>,
) -> Result<Resolution> {
    let info = cycle::lookup_mod(ctx, input).await?;
    let selector = VersionSelector::from_arg(version);
    println!("Resolving {} ({})...", info.name, selector_label(&selector));

    let ctx = Arc::clone(ctx);
    let name = info.name;
    let resolution =
        cycle::run_blocking(move |cancel| ctx.resolve_root(&name, &selector, cancel)).await?;
    cycle::print_report(&resolution);
    Ok(resolution)
}

fn selector_label(selector: &VersionSelector) -> &str {
    match selector {
        VersionSelector::Latest => "latest",
        VersionSelector::Exact(v) => v.as_str(),
    }
}
