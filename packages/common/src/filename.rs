//! Names of files inside an upload bundle.
//!
//! Bundles are flat: a name is a single segment that is later shown in the
//! preview's file list and used to pick the entry document.

/// Longest accepted name, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("filename is empty")]
    Empty,
    #[error("filename is longer than 255 bytes")]
    TooLong,
    #[error("folders are not supported, upload files only")]
    Separator,
    #[error("'.' and '..' are not files")]
    DotSegment,
    #[error("filename contains control characters")]
    ControlCharacter,
}

/// Check that `filename` is one flat segment and return it without
/// surrounding whitespace.
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let name = filename.trim();

    match name {
        "" => return Err(FilenameError::Empty),
        "." | ".." => return Err(FilenameError::DotSegment),
        _ if name.len() > MAX_FILENAME_BYTES => return Err(FilenameError::TooLong),
        _ => {}
    }

    for c in name.chars() {
        match c {
            '/' | '\\' => return Err(FilenameError::Separator),
            // NUL included; CR/LF would also break header values.
            c if c.is_control() => return Err(FilenameError::ControlCharacter),
            _ => {}
        }
    }
    Ok(name)
}
