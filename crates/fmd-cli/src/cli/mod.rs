//! CLI for FMD, the Factorio mod downloader.

mod commands;
mod cycle;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fmd_core::config::FmdConfig;
use fmd_core::context::Context;
use std::path::PathBuf;
use std::sync::Arc;

use commands::{
    run_checksum, run_clear_cache, run_download, run_import, run_info, run_install, run_search,
    run_serve, run_set_path,
};

/// Top-level CLI for FMD.
#[derive(Debug, Parser)]
#[command(name = "fmd")]
#[command(about = "FMD: Factorio mod downloader with dependency resolution", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a mod and its required dependencies into the cache.
    Download {
        /// Mod name or mods.factorio.com URL.
        name: String,
        /// Exact release version (default: latest).
        #[arg(long)]
        version: Option<String>,
    },

    /// Download a mod with its dependencies and install them into the game.
    Install {
        /// Mod name or mods.factorio.com URL.
        name: String,
        /// Exact release version (default: latest).
        #[arg(long)]
        version: Option<String>,
    },

    /// Show portal information about a mod.
    Info {
        /// Mod name or mods.factorio.com URL.
        name: String,
        /// List every release instead of the newest few.
        #[arg(long)]
        all: bool,
    },

    /// Search the mod catalog by name.
    Search {
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value = "5", value_name = "N")]
        limit: usize,
    },

    /// Set the Factorio game directory used for installs.
    SetPath {
        /// Directory containing `mods` or `data`.
        path: PathBuf,
    },

    /// Download and install every enabled mod of a mod-list.json.
    Import {
        /// Path to mod-list.json.
        #[arg(default_value = "mod-list.json")]
        path: PathBuf,
    },

    /// Run the local HTTP server used by the browser userscript.
    Serve {
        /// Listen address (default from config, 127.0.0.1:5000).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Delete all cached mod archives and checksums.
    ClearCache,

    /// Compute SHA-1 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    /// Run the parsed command with the loaded config.
    pub async fn run(self, cfg: FmdConfig) -> Result<()> {
        tracing::debug!("loaded config: {:?}", cfg);

        match self {
            CliCommand::Download { name, version } => {
                let ctx = open_context(cfg)?;
                cycle::warm_catalog(&ctx);
                run_download(ctx, &name, version.as_deref()).await?
            }
            CliCommand::Install { name, version } => {
                let ctx = open_context(cfg)?;
                cycle::warm_catalog(&ctx);
                run_install(ctx, &name, version.as_deref()).await?
            }
            CliCommand::Info { name, all } => run_info(open_context(cfg)?, &name, all).await?,
            CliCommand::Search { query, limit } => {
                run_search(open_context(cfg)?, &query, limit).await?
            }
            CliCommand::SetPath { path } => run_set_path(cfg, &path).await?,
            CliCommand::Import { path } => run_import(open_context(cfg)?, &path).await?,
            CliCommand::Serve { bind } => {
                let ctx = open_context(cfg)?;
                cycle::warm_catalog(&ctx);
                run_serve(ctx, bind).await?
            }
            CliCommand::ClearCache => run_clear_cache(open_context(cfg)?).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

fn open_context(cfg: FmdConfig) -> Result<Arc<Context>> {
    Ok(Arc::new(Context::new(cfg)?))
}

#[cfg(test)]
mod tests;
