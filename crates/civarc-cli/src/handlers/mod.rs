//! Command handlers.

pub mod images;
pub mod models;

use std::future::Future;

use anyhow::{Result, bail};
use tracing::warn;

use crate::commands::{ArchiveArgs, Commands};
use crate::parser::Cli;

/// Run the selected command to completion.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Models(args) => models::execute(&cli.dir, args).await,
        Commands::Images(args) => images::execute(&cli.dir, args).await,
    }
}

/// Drive `work` until it finishes or `interrupt` resolves first.
///
/// An interrupt ends the run at its current await point and counts as a
/// clean exit.
pub async fn run_until<W, I>(work: W, interrupt: I) -> Result<()>
where
    W: Future<Output = Result<()>>,
    I: Future,
{
    tokio::select! {
        result = work => result,
        _ = interrupt => {
            warn!("SIGINT received");
            Ok(())
        }
    }
}

fn require_mode(args: &ArchiveArgs) -> Result<()> {
    if !args.download && !args.verify {
        bail!("Nothing to do: pass --download and/or --verify");
    }
    Ok(())
}
