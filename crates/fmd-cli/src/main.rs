use clap::Parser;
use fmd_core::{config, logging};

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => fail(err),
    };
    logging::init(cfg.log_filter.as_deref());

    if let Err(err) = cli.command.run(cfg).await {
        fail(err);
    }
}

fn fail(err: anyhow::Error) -> ! {
    eprintln!("fmd error: {:#}", err);
    std::process::exit(1);
}
