//! Subcommands and their flags.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use civarc_api::DEFAULT_IGNORABLE_STATUS_CODES;
use civarc_download::{ArchiveOptions, ListingSource};

#[derive(Subcommand)]
pub enum Commands {
    /// Archive models, their versions, files and preview images
    Models(ModelsArgs),

    /// Archive standalone images
    Images(ImagesArgs),
}

/// Flags shared by both archive kinds.
#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Extra listing query parameter as key=value (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Download metadata and assets
    #[arg(long)]
    pub download: bool,

    /// Verify archived files (after each item with --download)
    #[arg(long)]
    pub verify: bool,

    /// Save metadata only, no asset downloads
    #[arg(long)]
    pub metadata_only: bool,

    /// Only archive NSFW items, also applies to --metadata-only
    #[arg(long)]
    pub nsfw_only: bool,

    /// Replay metadata saved by a previous run instead of listing the API
    #[arg(long, conflicts_with = "from_url_file")]
    pub from_metadata: bool,

    /// Archive the ids or URLs listed in this file, one per line
    #[arg(long, value_name = "PATH")]
    pub from_url_file: Option<PathBuf>,

    /// Rewrite metadata files that already exist
    #[arg(long)]
    pub refresh_metadata: bool,

    /// Asset HTTP status that is skipped instead of retried (repeatable)
    #[arg(
        long = "ignore-status-code",
        value_name = "CODE",
        value_delimiter = ',',
        default_values_t = DEFAULT_IGNORABLE_STATUS_CODES
    )]
    pub ignore_status_codes: Vec<u16>,

    /// Base URL of the civitai API
    #[arg(long, env = "CIVARC_API_BASE", default_value = "https://civitai.com/api/v1")]
    pub api_base: String,
}

impl ArchiveArgs {
    pub fn listing_source(&self) -> ListingSource {
        if self.from_metadata {
            ListingSource::Metadata
        } else if let Some(path) = &self.from_url_file {
            ListingSource::IdFile(path.clone())
        } else {
            ListingSource::Api {
                params: self.params.clone(),
            }
        }
    }

    pub fn options(&self) -> ArchiveOptions {
        ArchiveOptions::new()
            .with_metadata_only(self.metadata_only)
            .with_nsfw_only(self.nsfw_only)
            .with_refresh_metadata(self.refresh_metadata)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ModelsArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Download only the latest version; --verify removes older ones
    #[arg(long)]
    pub latest_only: bool,
}

impl ModelsArgs {
    pub fn options(&self) -> ArchiveOptions {
        self.archive.options().with_latest_only(self.latest_only)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ImagesArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Download images at their original resolution
    #[arg(long)]
    pub original_image: bool,
}

impl ImagesArgs {
    pub fn options(&self) -> ArchiveOptions {
        self.archive.options().with_original_image(self.original_image)
    }
}
