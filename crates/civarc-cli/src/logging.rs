//! Log sinks: stdout plus an append-only log file.
//!
//! Both sinks sit behind [`RedactingWriter`], so a `token=<value>` query
//! fragment never reaches the terminal or the file.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use civarc_core::redact_secrets;

/// `MakeWriter` wrapper that redacts secrets from every emitted line.
#[derive(Debug, Clone)]
pub struct RedactingWriter<M> {
    inner: M,
}

impl<M> RedactingWriter<M> {
    pub const fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactedLine<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactedLine::new(self.inner.make_writer())
    }
}

/// Buffers one formatted event and writes it redacted on flush or drop.
pub struct RedactedLine<W: Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: Write> RedactedLine<W> {
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buffer);
        let redacted = redact_secrets(&text);
        self.inner.write_all(redacted.as_bytes())?;
        self.buffer.clear();
        Ok(())
    }
}

impl<W: Write> Write for RedactedLine<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for RedactedLine<W> {
    fn drop(&mut self) {
        if let Err(e) = self.emit() {
            eprintln!("Failed to write log line: {e}");
        }
    }
}

/// Install the global subscriber.
///
/// Level comes from `RUST_LOG`, else `debug` when verbose, else `info`. The
/// returned guard flushes the file sink when dropped.
pub fn init(log_file: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", log_file.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(RedactingWriter::new(io::stdout)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(RedactingWriter::new(file_writer))
                .with_ansi(false),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}
