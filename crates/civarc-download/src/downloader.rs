//! Streams a single asset to disk.
//!
//! One call to [`AssetDownloader::download`] is one retried network
//! operation: statuses in the caller's ignorable set end it at once, any
//! other failure is retried under the client's [`RetryPolicy`]. Partial
//! files are left behind on failure; the verify pass reports them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, warn};
use url::Url;

use civarc_api::{
    ApiClient, ApiError, ApiResult, ByteStream, HttpBackend, RetryOutcome, RetryPolicy, Sleeper,
    retry,
};
use civarc_core::HASH_CHUNK_SIZE;

/// How a single asset download ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The asset was written to this path.
    Success(PathBuf),
    /// The asset is permanently unavailable and was skipped without retry.
    ///
    /// `status` is `None` when the URL itself could not be parsed.
    SkippedByPolicy { status: Option<u16> },
    /// Every attempt failed.
    ExhaustedRetries { attempts: u8 },
}

/// File extension for a response `Content-Type`.
///
/// Parameters such as `; charset=binary` are ignored. Unknown types have no
/// extension.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    CONTENT_TYPE_EXTENSIONS
        .iter()
        .find(|(known, _)| mime.eq_ignore_ascii_case(known))
        .map(|(_, ext)| *ext)
}

const CONTENT_TYPE_EXTENSIONS: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// Every extension an auto-detected download can end up with.
pub fn detected_extensions() -> impl Iterator<Item = &'static str> {
    CONTENT_TYPE_EXTENSIONS.iter().map(|(_, ext)| *ext)
}

/// `target` with `.ext` appended to its file name.
pub fn with_appended_extension(target: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Downloads assets over the shared HTTP backend.
pub struct AssetDownloader<B: HttpBackend> {
    backend: Arc<B>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl<B: HttpBackend> AssetDownloader<B> {
    pub fn new(backend: Arc<B>, sleeper: Arc<dyn Sleeper>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            sleeper,
            policy,
        }
    }

    /// Share the backend, sleeper and retry policy of an API client.
    pub fn from_client(client: &ApiClient<B>) -> Self {
        Self::new(client.backend(), client.sleeper(), client.retry_policy())
    }

    /// Download `url` to `target`.
    ///
    /// With `auto_detect_extension`, `target` is a stem and the extension is
    /// appended from the response content type; unknown types leave the
    /// stem as is.
    pub async fn download(
        &self,
        url: &str,
        target: &Path,
        auto_detect_extension: bool,
        ignorable_status_codes: &[u16],
    ) -> DownloadOutcome {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                error!(url, error = %e, "Asset URL is not valid, skipping");
                return DownloadOutcome::SkippedByPolicy { status: None };
            }
        };

        let outcome = retry(
            self.policy,
            self.sleeper.as_ref(),
            url.as_str(),
            |err| err.has_status_in(ignorable_status_codes),
            || self.attempt(&url, target, auto_detect_extension),
        )
        .await;

        match outcome {
            RetryOutcome::Done(path) => {
                info!(%url, path = %path.display(), "Downloaded");
                DownloadOutcome::Success(path)
            }
            RetryOutcome::Skipped(err) => {
                warn!(%url, error = %err, "Asset unavailable, skipping");
                DownloadOutcome::SkippedByPolicy {
                    status: err.status(),
                }
            }
            RetryOutcome::Exhausted { attempts, .. } => {
                error!(%url, "Failed to download, maximum retries exceeded");
                DownloadOutcome::ExhaustedRetries { attempts }
            }
        }
    }

    async fn attempt(&self, url: &Url, target: &Path, auto_detect_extension: bool) -> ApiResult<PathBuf> {
        let response = self.backend.get_stream(url).await?;
        if !response.is_success() {
            return Err(ApiError::InvalidStatusCode {
                status: response.status,
                url: url.to_string(),
            });
        }

        let path = if auto_detect_extension {
            match response.content_type.as_deref().and_then(extension_for_content_type) {
                Some(ext) => with_appended_extension(target, ext),
                None => {
                    debug!(content_type = ?response.content_type, "No extension for content type");
                    target.to_path_buf()
                }
            }
        } else {
            target.to_path_buf()
        };

        write_body(&path, response.body).await?;
        Ok(path)
    }
}

fn write_failed(path: &Path, e: &std::io::Error) -> ApiError {
    ApiError::Transport(format!("writing {}: {e}", path.display()))
}

/// Stream `body` into `path`. Whatever arrived before a failure is flushed
/// to disk.
async fn write_body(path: &Path, mut body: ByteStream) -> ApiResult<()> {
    let file = File::create(path).await.map_err(|e| write_failed(path, &e))?;
    let mut writer = BufWriter::with_capacity(HASH_CHUNK_SIZE, file);

    let copied = copy_chunks(&mut writer, &mut body, path).await;
    let flushed = writer.flush().await.map_err(|e| write_failed(path, &e));
    copied.and(flushed)
}

async fn copy_chunks(writer: &mut BufWriter<File>, body: &mut ByteStream, path: &Path) -> ApiResult<()> {
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| write_failed(path, &e))?;
    }
    Ok(())
}
