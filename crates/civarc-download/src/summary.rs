//! Counters reported by archive passes.

use tracing::info;

use civarc_core::FileHealth;

use crate::downloader::DownloadOutcome;

/// What happened to the assets an archive tried to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetTally {
    pub downloaded: usize,
    pub already_present: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl AssetTally {
    pub const fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success(_) => self.downloaded += 1,
            DownloadOutcome::SkippedByPolicy { .. } => self.skipped += 1,
            DownloadOutcome::ExhaustedRetries { .. } => self.failed += 1,
        }
    }

    pub const fn merge(&mut self, other: Self) {
        self.downloaded += other.downloaded;
        self.already_present += other.already_present;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Health of the assets seen by a verify pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyTally {
    pub verified: usize,
    pub present: usize,
    pub corrupt: usize,
    pub missing: usize,
}

impl VerifyTally {
    pub const fn record(&mut self, health: &FileHealth) {
        match health {
            FileHealth::Verified => self.verified += 1,
            FileHealth::Present => self.present += 1,
            FileHealth::Corrupt { .. } => self.corrupt += 1,
            FileHealth::Missing => self.missing += 1,
        }
    }

    pub const fn merge(&mut self, other: Self) {
        self.verified += other.verified;
        self.present += other.present;
        self.corrupt += other.corrupt;
        self.missing += other.missing;
    }

    pub const fn problems(&self) -> usize {
        self.corrupt + self.missing
    }
}

/// Result of running one archive through its phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub assets: AssetTally,
    pub verification: VerifyTally,
    /// Superseded version directories deleted by the verify phase.
    pub pruned: usize,
}

impl ArchiveReport {
    pub const fn merge(&mut self, other: Self) {
        self.assets.merge(other.assets);
        self.verification.merge(other.verification);
        self.pruned += other.pruned;
    }
}

/// How one listing item was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Archived(ArchiveReport),
    /// Rejected by the NSFW filter.
    Filtered,
    /// The record could not be parsed.
    ParseError,
    /// Local filesystem trouble while archiving the item.
    Failed,
}

/// Totals of one pipeline pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub items_seen: usize,
    pub archived: usize,
    pub filtered: usize,
    pub parse_errors: usize,
    pub failed: usize,
    pub report: ArchiveReport,
}

impl RunSummary {
    pub const fn record(&mut self, outcome: &ItemOutcome) {
        self.items_seen += 1;
        match outcome {
            ItemOutcome::Archived(report) => {
                self.archived += 1;
                self.report.merge(*report);
            }
            ItemOutcome::Filtered => self.filtered += 1,
            ItemOutcome::ParseError => self.parse_errors += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }

    pub fn log(&self, pass: &str) {
        let assets = &self.report.assets;
        let verification = &self.report.verification;
        info!(
            pass,
            items = self.items_seen,
            archived = self.archived,
            filtered = self.filtered,
            parse_errors = self.parse_errors,
            failed = self.failed,
            downloaded = assets.downloaded,
            already_present = assets.already_present,
            skipped = assets.skipped,
            download_failures = assets.failed,
            verified = verification.verified,
            corrupt = verification.corrupt,
            missing = verification.missing,
            pruned = self.report.pruned,
            "Pass finished"
        );
    }
}
