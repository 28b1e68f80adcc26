//! `civarc models`

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::require_mode;
use crate::bootstrap::build_pipeline;
use crate::commands::ModelsArgs;

pub async fn execute(root: &Path, args: &ModelsArgs) -> Result<()> {
    require_mode(&args.archive)?;
    let pipeline = build_pipeline(root, &args.archive, args.options())?;

    let summary = if args.archive.download {
        info!(root = %root.display(), "Archiving models");
        pipeline
            .download_models(&args.archive.listing_source(), args.archive.verify)
            .await
            .context("Model archive aborted")?
    } else {
        info!(root = %root.display(), "Verifying archived models");
        pipeline.verify_models().await
    };

    info!(
        items = summary.items_seen,
        archived = summary.archived,
        problems = summary.report.verification.problems(),
        "Done"
    );
    Ok(())
}
