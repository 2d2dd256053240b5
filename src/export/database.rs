//! SQLite export download. The advertised `Content-Length` from a HEAD request decides
//! whether anything needs fetching; a local file of exactly that size counts as complete.

use crate::export::{check_status, invalid_url, ExportClient, ExportError};
use reqwest::header::CONTENT_LENGTH;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// What `get_db` did. All variants are success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseOutcome {
    /// Export is empty; nothing fetched or written.
    NoData { advertised: u64 },
    /// Local file already has the advertised size; nothing fetched.
    AlreadyComplete { path: PathBuf, advertised: u64 },
    /// Body streamed into `path`.
    Downloaded {
        path: PathBuf,
        advertised: u64,
        written: u64,
    },
}

/// Target path for a project's SQLite export.
pub fn sqlite_path(project: &str, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.sqlite", project))
}

/// Download the SQLite export of `project` into `output_dir/{project}.sqlite`.
///
/// `progress` is called with (bytes written so far, advertised length) while copying.
pub fn get_db(
    client: &mut ExportClient,
    project: &str,
    output_dir: &Path,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<DatabaseOutcome, ExportError> {
    let url = client
        .endpoints()
        .export_url(project)
        .map_err(|e| invalid_url(&client.endpoints().site_base, e))?;

    let advertised = {
        let head = client.head(url.clone()).map_err(|e| ExportError::Network {
            url: url.to_string(),
            source: e,
        })?;
        let head = check_status(head, &url)?;
        advertised_length(head.headers())
    };

    if advertised == 0 {
        return Ok(DatabaseOutcome::NoData { advertised });
    }

    let path = sqlite_path(project, output_dir);
    if let Ok(meta) = std::fs::metadata(&path) {
        if meta.is_file() && meta.len() == advertised {
            return Ok(DatabaseOutcome::AlreadyComplete { path, advertised });
        }
    }

    let mut file = File::create(&path).map_err(|e| ExportError::CreateFile {
        path: path.clone(),
        source: e,
    })?;

    let response = client.get(url.clone()).map_err(|e| ExportError::Network {
        url: url.to_string(),
        source: e,
    })?;
    let response = check_status(response, &url)?;

    let mut reader = ProgressReader {
        inner: response,
        read: 0,
        total: advertised,
        progress,
    };
    let written = std::io::copy(&mut reader, &mut file).map_err(|e| ExportError::Copy {
        path: path.clone(),
        source: e,
    })?;

    Ok(DatabaseOutcome::Downloaded {
        path,
        advertised,
        written,
    })
}

/// `Content-Length` header as sent by the server; missing or unparseable is 0.
///
/// Read from the header map rather than the body size hint, which is empty for HEAD.
fn advertised_length(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

struct ProgressReader<'a, R> {
    inner: R,
    read: u64,
    total: u64,
    progress: Option<&'a dyn Fn(u64, u64)>,
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        if let Some(cb) = self.progress {
            cb(self.read, self.total);
        }
        Ok(n)
    }
}
