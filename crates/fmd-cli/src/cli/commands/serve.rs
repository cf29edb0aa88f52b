//! `fmd serve` – run the browser control server until Ctrl-C.

use anyhow::Result;
use fmd_core::context::Context;
use std::sync::Arc;

use crate::cli::server;

pub async fn run_serve(ctx: Arc<Context>, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| ctx.config().server_bind.clone());
    server::serve(ctx, &bind).await
}
