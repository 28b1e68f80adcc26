//! Root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Archive models and images from the civitai public API.
#[derive(Parser)]
#[command(name = "civarc")]
#[command(about = "Archive models and images from civitai")]
#[command(version)]
pub struct Cli {
    /// Archive root directory
    #[arg(long, global = true, env = "CIVARC_DIR", default_value = "downloaded")]
    pub dir: PathBuf,

    /// File every log line is appended to
    #[arg(long, global = true, env = "CIVARC_LOG_FILE", default_value = "log.log")]
    pub log_file: PathBuf,

    /// Enable debug output (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
