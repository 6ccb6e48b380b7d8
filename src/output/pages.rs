//! Mapping fetched pages to files under the destination folder
//!
//! A page is stored under `<dest>/<host>[_<port>]/`. Every path segment but
//! the last becomes a directory whose name carries a trailing `~`; the last
//! segment is the file name, or `index.html` when the path is empty or ends
//! in `/`. A query string is appended to the file name after `_`.
//!
//! Sanitized names never contain `~`, so a page file and a directory can
//! never claim the same name: `/docs` and `/docs/intro` are saved as
//! `docs` and `docs~/intro`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// File name used for directory-like URLs
const INDEX_FILE: &str = "index.html";

/// Suffix that marks a directory built from a path segment
const DIR_MARKER: char = '~';

/// Computes where a page is saved
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use webcp::output::page_path;
///
/// let url = Url::parse("http://example.com/docs/").unwrap();
/// assert_eq!(
///     page_path(Path::new("/mirror"), &url),
///     Path::new("/mirror/example.com/docs~/index.html")
/// );
/// ```
pub fn page_path(dest: &Path, url: &Url) -> PathBuf {
    let mut path = dest.to_path_buf();

    let host = url.host_str().unwrap_or("unknown-host");
    match url.port() {
        Some(port) => path.push(format!("{}_{}", sanitize(host), port)),
        None => path.push(sanitize(host)),
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    let (file, dirs) = match segments.split_last() {
        Some((last, dirs)) if !last.is_empty() => (sanitize(last), dirs),
        Some((_, dirs)) => (INDEX_FILE.to_string(), dirs),
        None => (INDEX_FILE.to_string(), &[][..]),
    };

    for dir in dirs.iter().filter(|dir| !dir.is_empty()) {
        path.push(format!("{}{}", sanitize(dir), DIR_MARKER));
    }

    match url.query() {
        Some(query) if !query.is_empty() => path.push(format!("{}_{}", file, sanitize(query))),
        _ => path.push(file),
    }

    path
}

/// The file a page is saved to, created on first write
///
/// Nothing touches the disk until the first write or flush, so a page whose
/// request fails leaves no file behind and keeps any copy from an earlier
/// run. Parent directories are created along with the file.
#[derive(Debug)]
pub struct PageFile {
    path: PathBuf,
    file: Option<File>,
}

impl PageFile {
    /// Prepares the file for `url` under `dest` without creating it
    pub fn new(dest: &Path, url: &Url) -> Self {
        Self {
            path: page_path(dest, url),
            file: None,
        }
    }

    /// Returns where the page is saved
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the file exists on disk yet
    pub fn is_created(&self) -> bool {
        self.file.is_some()
    }

    /// Removes a partially written file
    ///
    /// Does nothing if the file was never created.
    pub fn discard(mut self) -> io::Result<()> {
        if self.file.take().is_some() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn open(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                File::create(&self.path)?
            }
        };
        Ok(self.file.insert(file))
    }
}

impl Write for PageFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.open()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.open()?.flush()
    }
}

/// Replaces characters that are unsafe in file names
fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' | '%' => c,
            _ => '_',
        })
        .collect();

    match cleaned.as_str() {
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}
