//! Composition root: builds the API client and archive pipeline from the
//! parsed arguments.

use std::path::Path;

use anyhow::{Context, Result};

use civarc_api::{ApiClientConfig, DefaultApiClient, ReqwestBackend};
use civarc_download::{ArchiveOptions, Pipeline};

use crate::commands::ArchiveArgs;

/// Client configuration for one invocation.
pub fn client_config(args: &ArchiveArgs) -> ApiClientConfig {
    ApiClientConfig::new()
        .with_base_url(args.api_base.clone())
        .with_ignorable_status_codes(args.ignore_status_codes.clone())
}

/// Wire a pipeline archiving below `root`.
pub fn build_pipeline(
    root: &Path,
    args: &ArchiveArgs,
    options: ArchiveOptions,
) -> Result<Pipeline<ReqwestBackend>> {
    let client = DefaultApiClient::new(client_config(args))
        .with_context(|| format!("Failed to create API client for {}", args.api_base))?;
    Ok(Pipeline::new(client, root, options))
}
