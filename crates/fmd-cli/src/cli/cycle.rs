//! Shared plumbing for commands that run resolve cycles.
//!
//! The core engine is blocking; cycles run on `spawn_blocking` with a
//! [`CancelToken`] that Ctrl-C trips.

use anyhow::{bail, Context as _, Result};
use fmd_core::context::{Context, Resolution};
use fmd_core::control::CancelToken;
use fmd_core::error::ResolveAbort;
use fmd_core::portal::{ModInfo, SearchHit};
use fmd_core::resolver::NodeOutcome;
use fmd_core::url_model;
use std::sync::Arc;

/// Number of "did you mean" suggestions for an unknown name.
const SUGGESTIONS: usize = 5;

/// Fetch the catalog in the background so name lookups and search are fast.
pub fn warm_catalog(ctx: &Arc<Context>) {
    let ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || ctx.portal().warm_catalog());
}

/// Cancel token tripped by Ctrl-C while this guard is alive.
pub struct CtrlCGuard {
    token: CancelToken,
    watcher: tokio::task::JoinHandle<()>,
}

impl CtrlCGuard {
    pub fn install() -> Self {
        let token = CancelToken::new();
        let tripped = token.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted; stopping after the current transfer.");
                tripped.cancel();
            }
        });
        Self { token, watcher }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

/// Run `cycle` on a blocking thread with a Ctrl-C-wired cancel token.
pub async fn run_blocking<T, F>(cycle: F) -> Result<T>
where
    F: FnOnce(CancelToken) -> Result<T, ResolveAbort> + Send + 'static,
    T: Send + 'static,
{
    let guard = CtrlCGuard::install();
    let token = guard.token();
    let result = tokio::task::spawn_blocking(move || cycle(token))
        .await
        .context("resolve task failed")?;
    drop(guard);
    Ok(result?)
}

/// Metadata call on a blocking thread.
pub async fn blocking<T, F>(ctx: &Arc<Context>, call: F) -> Result<T>
where
    F: FnOnce(&Context) -> T + Send + 'static,
    T: Send + 'static,
{
    let ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || call(&ctx))
        .await
        .context("portal task failed")
}

/// Turn user input (name or portal URL) into a mod known to the portal.
///
/// Any failed lookup other than an interrupt is treated as an unknown name:
/// the closest catalog matches are printed and the call fails.
pub async fn lookup_mod(ctx: &Arc<Context>, input: &str) -> Result<ModInfo> {
    let name = url_model::mod_name_from_input(input)?;
    if name != input.trim() {
        println!("Mod name: {}", name);
    }
    let query = name.clone();
    match blocking(ctx, move |ctx| ctx.portal().summary(&query)).await? {
        Ok(info) => Ok(info),
        Err(e) if e.is_interrupted() => Err(e).with_context(|| format!("look up {:?}", name)),
        Err(e) => {
            tracing::debug!(mod_name = %name, "portal lookup failed: {}", e);
            print_suggestions(&name, &suggestions(ctx, &name).await);
            bail!("mod {:?} not found", name)
        }
    }
}

/// Closest catalog names to `name`; empty when the catalog is unavailable.
pub async fn suggestions(ctx: &Arc<Context>, name: &str) -> Vec<SearchHit> {
    let query = name.to_lowercase();
    match blocking(ctx, move |ctx| ctx.portal().search(&query, SUGGESTIONS)).await {
        Ok(Ok(hits)) => hits,
        Ok(Err(e)) => {
            tracing::debug!("no suggestions, catalog unavailable: {}", e);
            Vec::new()
        }
        Err(e) => {
            tracing::debug!("no suggestions: {:#}", e);
            Vec::new()
        }
    }
}

fn print_suggestions(name: &str, hits: &[SearchHit]) {
    if hits.is_empty() {
        return;
    }
    println!("Mod {:?} not found. Did you mean:", name);
    for hit in hits {
        println!("  - {} ({:.0}%)", hit.name, hit.score * 100.0);
    }
}

/// One line per resolved or failed node, then a summary.
pub fn print_report(resolution: &Resolution) {
    for node in &resolution.report {
        match &node.outcome {
            NodeOutcome::Fetched {
                version,
                file_name,
                from_cache,
            } => {
                let source = if *from_cache { "cached" } else { "downloaded" };
                println!("  {:<40} {:<12} {} ({})", node.name, version, file_name, source);
            }
            NodeOutcome::Ignored => {}
            NodeOutcome::Failed(e) => println!("  {:<40} FAILED: {}", node.name, e),
        }
    }
    let failed = resolution
        .report
        .iter()
        .filter(|n| matches!(n.outcome, NodeOutcome::Failed(_)))
        .count();
    println!(
        "{} mod(s) resolved, {} failed.",
        resolution.visited.resolved_count(),
        failed
    );
}
