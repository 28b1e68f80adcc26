//! Behaviour toggles of an archive pass.

/// Per-run archive policy.
///
/// # Example
///
/// ```
/// use civarc_download::ArchiveOptions;
///
/// let options = ArchiveOptions::new().with_latest_only(true).with_nsfw_only(true);
/// assert!(options.latest_only);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Persist metadata but never download assets.
    pub metadata_only: bool,
    /// Only the newest version is downloaded; verify prunes the others.
    pub latest_only: bool,
    /// Skip items whose NSFW flag is false.
    pub nsfw_only: bool,
    /// Request images at their declared width instead of the preview size.
    pub original_image: bool,
    /// Rewrite metadata files that already exist.
    pub refresh_metadata: bool,
}

impl ArchiveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_metadata_only(mut self, enabled: bool) -> Self {
        self.metadata_only = enabled;
        self
    }

    #[must_use]
    pub const fn with_latest_only(mut self, enabled: bool) -> Self {
        self.latest_only = enabled;
        self
    }

    #[must_use]
    pub const fn with_nsfw_only(mut self, enabled: bool) -> Self {
        self.nsfw_only = enabled;
        self
    }

    #[must_use]
    pub const fn with_original_image(mut self, enabled: bool) -> Self {
        self.original_image = enabled;
        self
    }

    #[must_use]
    pub const fn with_refresh_metadata(mut self, enabled: bool) -> Self {
        self.refresh_metadata = enabled;
        self
    }

    /// Whether an item with the given NSFW flag passes the filter.
    pub const fn admits(&self, nsfw: bool) -> bool {
        !self.nsfw_only || nsfw
    }
}
