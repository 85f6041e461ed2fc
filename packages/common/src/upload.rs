//! Reading a user's file selection into an in-memory bundle.
//!
//! Every file is read to the end concurrently, but the resulting bundle keeps
//! the order in which the source presented the files.

use std::fmt;
use std::io::Cursor;

use futures::future::try_join_all;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::filename::{FilenameError, validate_flat_filename};
use crate::models::UploadedFile;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Default cap on the number of files per bundle.
pub const DEFAULT_MAX_FILES: usize = 200;

/// Default cap on the summed size of a bundle in bytes.
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 8 * 1024 * 1024; // 8 MB

/// A file as handed over by the user, before its content has been read.
pub struct RawFile {
    pub name: String,
    /// MIME type declared by the source, if any.
    pub mime_type: Option<String>,
    pub reader: BoxReader,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, reader: BoxReader) -> Self {
        Self {
            name: name.into(),
            mime_type,
            reader,
        }
    }

    /// Wrap an in-memory payload.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: Option<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(name, mime_type, Box::new(Cursor::new(data.into())))
    }
}

impl fmt::Debug for RawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Size limits applied while assembling a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_total_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Please select at least one file")]
    NoFiles,
    #[error("Please enter a site name")]
    MissingName,
    #[error("Too many files ({count} > {limit})")]
    TooManyFiles { count: usize, limit: usize },
    #[error("Bundle exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge { actual: u64, limit: u64 },
    #[error("{name:?}: {reason}")]
    InvalidFilename { name: String, reason: FilenameError },
    #[error("failed to read {name:?}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Check that a submission has a display name and at least one file.
///
/// Runs before any file is read.
pub fn validate_selection(name: &str, file_count: usize) -> Result<(), UploadError> {
    if file_count == 0 {
        return Err(UploadError::NoFiles);
    }
    if name.trim().is_empty() {
        return Err(UploadError::MissingName);
    }
    Ok(())
}

/// Read every file of a selection into memory.
pub async fn assemble(
    files: Vec<RawFile>,
    limits: &UploadLimits,
) -> Result<Vec<UploadedFile>, UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }
    if files.len() > limits.max_files {
        return Err(UploadError::TooManyFiles {
            count: files.len(),
            limit: limits.max_files,
        });
    }

    let mut pending = Vec::with_capacity(files.len());
    for file in files {
        let name = validate_flat_filename(&file.name)
            .map_err(|reason| UploadError::InvalidFilename {
                name: file.name.clone(),
                reason,
            })?
            .to_string();
        let mime_type = resolve_mime_type(&name, file.mime_type.as_deref());
        pending.push((name, mime_type, file.reader));
    }

    let cap = limits.max_total_bytes;
    let read = try_join_all(
        pending
            .into_iter()
            .map(|(name, mime_type, reader)| read_file(name, mime_type, reader, cap)),
    )
    .await?;

    let actual: u64 = read.iter().map(|(_, size)| size).sum();
    if actual > cap {
        return Err(UploadError::TooLarge { actual, limit: cap });
    }

    Ok(read.into_iter().map(|(file, _)| file).collect())
}

async fn read_file(
    name: String,
    mime_type: String,
    reader: BoxReader,
    cap: u64,
) -> Result<(UploadedFile, u64), UploadError> {
    let mut buf = Vec::new();
    // One byte past the cap is enough to know the bundle is too large.
    let size = reader
        .take(cap.saturating_add(1))
        .read_to_end(&mut buf)
        .await
        .map_err(|source| UploadError::Read {
            name: name.clone(),
            source,
        })? as u64;

    let content = String::from_utf8_lossy(&buf).into_owned();
    Ok((
        UploadedFile {
            name,
            content,
            mime_type,
        },
        size,
    ))
}

fn resolve_mime_type(name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_string(),
        _ => mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string(),
    }
}
