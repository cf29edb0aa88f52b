//! `fmd clear-cache` – delete cached archives and the checksum index.

use anyhow::Result;
use fmd_core::context::Context;
use std::sync::Arc;

use crate::cli::cycle;

pub async fn run_clear_cache(ctx: Arc<Context>) -> Result<()> {
    cycle::blocking(&ctx, |ctx| ctx.clear_cache()).await??;
    println!("Cache cleared: {}", ctx.cache_dir().display());
    Ok(())
}
