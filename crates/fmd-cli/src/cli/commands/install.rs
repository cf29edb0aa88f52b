//! `fmd install` – download a mod with its dependencies, then copy them into the game.

use anyhow::{bail, Result};
use fmd_core::context::Context;
use fmd_core::install::{InstallOutcome, InstallStatus};
use std::sync::Arc;

use super::download::fetch_closure;

pub async fn run_install(ctx: Arc<Context>, input: &str, version: Option<&str>) -> Result<()> {
    let resolution = fetch_closure(&ctx, input, version).await?;
    if resolution.visited.resolved_count() == 0 {
        bail!("nothing could be downloaded");
    }
    let Some(installer) = ctx.installer() else {
        bail!(
            "cannot install: Factorio path not set (run `fmd set-path <dir>`); files are in {}",
            ctx.cache_dir().display()
        );
    };

    println!("Installing into {}", installer.mods_dir().display());
    let outcomes = tokio::task::spawn_blocking(move || installer.install_set(&resolution.visited))
        .await?;
    print_outcomes(&outcomes);
    if outcomes
        .iter()
        .any(|o| matches!(o.status, InstallStatus::Failed(_)))
    {
        bail!("some mods could not be installed");
    }
    Ok(())
}

pub(super) fn print_outcomes(outcomes: &[InstallOutcome]) {
    for outcome in outcomes {
        let status = match &outcome.status {
            InstallStatus::Installed => "done".to_string(),
            InstallStatus::AlreadyInstalled => "already installed".to_string(),
            InstallStatus::Failed(e) => format!("failed: {}", e),
        };
        println!("  {:<50} {}", outcome.file_name, status);
    }
}
