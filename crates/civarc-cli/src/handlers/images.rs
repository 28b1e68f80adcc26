//! `civarc images`

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::require_mode;
use crate::bootstrap::build_pipeline;
use crate::commands::ImagesArgs;

pub async fn execute(root: &Path, args: &ImagesArgs) -> Result<()> {
    require_mode(&args.archive)?;
    let pipeline = build_pipeline(root, &args.archive, args.options())?;

    let summary = if args.archive.download {
        info!(root = %root.display(), "Archiving images");
        pipeline
            .download_images(&args.archive.listing_source(), args.archive.verify)
            .await
            .context("Image archive aborted")?
    } else {
        info!(root = %root.display(), "Verifying archived images");
        pipeline.verify_images()
    };

    info!(
        items = summary.items_seen,
        archived = summary.archived,
        missing = summary.report.verification.missing,
        "Done"
    );
    Ok(())
}
