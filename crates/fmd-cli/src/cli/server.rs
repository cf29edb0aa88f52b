//! Local HTTP control server for the browser userscript.
//!
//! - `GET /api/download/:mod_name`: resolve, download and (if the game
//!   directory is known) install a mod with its dependencies.
//! - `GET /api/status`: liveness plus whether installs are possible.
//!
//! Each download request runs its cycle on a blocking thread with a fresh
//! visited set. Cycles are serialized so two requests never write the same
//! cache file at once; Ctrl-C cancels the one in flight and stops the server.

use anyhow::{Context as _, Result};
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use fmd_core::context::Context;
use fmd_core::control::CancelToken;
use fmd_core::install::InstallStatus;
use fmd_core::resolver::VersionSelector;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct ServerState {
    ctx: Arc<Context>,
    shutdown: CancelToken,
    cycle_lock: Arc<Mutex<()>>,
}

impl ServerState {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self {
            ctx,
            shutdown: CancelToken::new(),
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum DownloadResponse {
    Installed {
        status: &'static str,
        #[serde(rename = "mod")]
        mod_name: String,
        installed: bool,
        files: Vec<Option<String>>,
        /// Files that could not be copied into the mods directory.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failed: Vec<String>,
    },
    CachedOnly {
        status: &'static str,
        #[serde(rename = "mod")]
        mod_name: String,
        installed: bool,
        message: &'static str,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    factorio_path_set: bool,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/download/:mod_name", get(handle_download))
        .route("/api/status", get(handle_status))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(ctx: Arc<Context>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to address: {}", addr))?;
    let local = listener
        .local_addr()
        .context("failed to get local addr for control server")?;
    let state = ServerState::new(ctx);
    let shutdown = state.shutdown.clone();

    tracing::info!("control server running at http://{}", local);
    println!("API server started at http://{} (Ctrl-C to stop)", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        })
        .await
        .context("control server failed")?;
    println!("API server stopped");
    Ok(())
}

async fn handle_download(
    Extension(state): Extension<ServerState>,
    Path(mod_name): Path<String>,
) -> impl IntoResponse {
    tracing::info!(mod_name = %mod_name, "browser requested download");
    let permit = state.cycle_lock.clone().lock_owned().await;
    let ctx = Arc::clone(&state.ctx);
    let cancel = state.shutdown.clone();
    let name = mod_name.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        download_cycle(&ctx, &name, cancel)
    })
    .await;

    match joined {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(mod_name = %mod_name, "download request failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DownloadResponse::Error {
                    error: format!("{:#}", e),
                }),
            )
        }
        Err(e) => {
            tracing::error!(mod_name = %mod_name, "download task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DownloadResponse::Error {
                    error: e.to_string(),
                }),
            )
        }
    }
}

fn download_cycle(
    ctx: &Context,
    mod_name: &str,
    cancel: CancelToken,
) -> Result<(StatusCode, Json<DownloadResponse>)> {
    let resolution = ctx.resolve_root(mod_name, &VersionSelector::Latest, cancel)?;
    let visited = resolution.visited;
    if visited.resolved_count() == 0 {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(DownloadResponse::Error {
                error: "Failed to resolve mod".to_string(),
            }),
        ));
    }

    let Some(installer) = ctx.installer() else {
        return Ok((
            StatusCode::OK,
            Json(DownloadResponse::CachedOnly {
                status: "success",
                mod_name: mod_name.to_string(),
                installed: false,
                message: "Downloaded to cache, but Factorio path not set",
            }),
        ));
    };
    let failed: Vec<String> = installer
        .install_set(&visited)
        .into_iter()
        .filter(|o| matches!(o.status, InstallStatus::Failed(_)))
        .map(|o| o.file_name)
        .collect();
    if !failed.is_empty() {
        tracing::warn!(mod_name, failed = ?failed, "some files were not installed");
    }
    let files = visited
        .iter()
        .map(|(_, file)| file.map(str::to_string))
        .collect();
    Ok((
        StatusCode::OK,
        Json(DownloadResponse::Installed {
            status: "success",
            mod_name: mod_name.to_string(),
            installed: true,
            files,
            failed,
        }),
    ))
}

async fn handle_status(Extension(state): Extension<ServerState>) -> impl IntoResponse {
    let ctx = Arc::clone(&state.ctx);
    let factorio_path_set = tokio::task::spawn_blocking(move || ctx.game_dir().is_some())
        .await
        .unwrap_or(false);
    Json(StatusResponse {
        status: "running",
        factorio_path_set,
    })
}
