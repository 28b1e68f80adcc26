//! `civarc` entry point.

use clap::Parser;

use civarc_cli::{Cli, handlers, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before parsing so `env` bindings see them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init(&cli.log_file, cli.verbose)?;

    // Dropping the pipeline closes any open file before we return
    handlers::run_until(handlers::dispatch(cli), tokio::signal::ctrl_c()).await
}
