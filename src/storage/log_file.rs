//! Durable, resumable frontier storage
//!
//! The frontier is kept in a single append-only log (see
//! [`record`](super::record) for the line format). Adding a page appends a
//! pending record; handing a page to the crawler appends a completed marker
//! *before* the page is returned, so a crash after dequeue never causes the
//! same page to be fetched again after a restart.
//!
//! On open, the log is scanned once for the most recent completed marker.
//! Reading then resumes just past the pending record of that URL. Nothing is
//! ever rewritten in place.

use crate::storage::record::{LogLineError, LogRecord};
use crate::storage::traits::{FrontierStorage, StorageError, StorageResult};
use crate::storage::FrontierEntry;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// File-backed frontier storage for resumable crawls
#[derive(Debug)]
pub struct LogFileStorage {
    /// Path of the log file
    path: PathBuf,

    /// Sequential read position over pending records
    reader: Option<BufReader<File>>,

    /// Append handle for new records
    writer: Option<File>,

    /// Every pending URL present in the log when it was opened
    known: Vec<String>,
}

/// Summary of the initial scan over an existing log
#[derive(Debug, Default)]
struct LogScan {
    last_completed: Option<String>,
    pending_urls: Vec<String>,
}

impl LogFileStorage {
    /// Opens or creates a log at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the resume log
    ///
    /// # Returns
    ///
    /// * `Ok((LogFileStorage, true))` - The log held a completed marker and
    ///   reading continues after it
    /// * `Ok((LogFileStorage, false))` - Fresh run; reading starts at the
    ///   beginning of the log
    /// * `Err(StorageError)` - The file could not be opened or created
    ///
    /// Handles opened before a failure are closed when this returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<(Self, bool)> {
        let path = path.as_ref();

        let writer = OpenOptions::new().create(true).append(true).open(path)?;
        let scan = scan_log(path)?;
        let mut reader = BufReader::new(File::open(path)?);

        let resumed = match &scan.last_completed {
            Some(last) => {
                if !skip_past_pending(&mut reader, last)? {
                    tracing::warn!(
                        "Completed URL {} has no pending record in {}",
                        last,
                        path.display()
                    );
                }
                tracing::info!("Resuming crawl after {}", last);
                true
            }
            None => false,
        };

        Ok((
            Self {
                path: path.to_path_buf(),
                reader: Some(reader),
                writer: Some(writer),
                known: scan.pending_urls,
            },
            resumed,
        ))
    }

    /// Returns the path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, record: &LogRecord) -> StorageResult<()> {
        let writer = self.writer.as_mut().ok_or(StorageError::Closed)?;
        writer.write_all(record.to_string().as_bytes())?;
        Ok(())
    }
}

impl FrontierStorage for LogFileStorage {
    fn add(&mut self, url: &Url, depth: u32) -> StorageResult<()> {
        self.append(&LogRecord::Pending {
            depth,
            url: url.to_string(),
        })
    }

    fn next(&mut self) -> StorageResult<Option<FrontierEntry>> {
        loop {
            let reader = self.reader.as_mut().ok_or(StorageError::Closed)?;
            let Some(line) = read_line(reader)? else {
                return Ok(None);
            };

            let (depth, raw_url) = match LogRecord::parse(&line) {
                Ok(LogRecord::Pending { depth, url }) => (depth, url),
                Ok(LogRecord::Completed { .. }) => continue,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            };

            let url = match Url::parse(&raw_url) {
                Ok(url) => url,
                Err(_) => {
                    tracing::warn!("{}", LogLineError::Url(raw_url));
                    continue;
                }
            };

            if let Err(e) = self.append(&LogRecord::Completed {
                url: raw_url.clone(),
            }) {
                tracing::warn!("Failed to record crawl for {} - {}", raw_url, e);
            }

            return Ok(Some(FrontierEntry::new(url, depth)));
        }
    }

    fn close(&mut self) -> StorageResult<()> {
        self.reader = None;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn known_urls(&self) -> Vec<String> {
        self.known.clone()
    }
}

/// Reads one line, decoding invalid UTF-8 lossily
///
/// Returns `None` at end of file. A later call may still return data if more
/// records were appended in the meantime.
fn read_line(reader: &mut impl BufRead) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Scans the whole log once
fn scan_log(path: &Path) -> StorageResult<LogScan> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut scan = LogScan::default();

    while let Some(line) = read_line(&mut reader)? {
        match LogRecord::parse(&line) {
            Ok(LogRecord::Completed { url }) => scan.last_completed = Some(url),
            Ok(LogRecord::Pending { url, .. }) => scan.pending_urls.push(url),
            Err(_) => {}
        }
    }

    Ok(scan)
}

/// Advances the reader past the first pending record for `url`
///
/// Returns false if no such record exists, leaving the reader at end of file.
fn skip_past_pending(reader: &mut impl BufRead, url: &str) -> StorageResult<bool> {
    while let Some(line) = read_line(reader)? {
        if let Ok(LogRecord::Pending { url: pending, .. }) = LogRecord::parse(&line) {
            if pending == url {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
