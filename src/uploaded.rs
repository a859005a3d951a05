//! Uploaded file handling.
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::stream::{Mode, Stream};

/// Upload outcome codes as reported by common multipart form handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum UploadErrorCode {
    /// Upload completed.
    Ok = 0,
    /// Exceeds the server-side size limit.
    IniSize = 1,
    /// Exceeds the form-declared size limit.
    FormSize = 2,
    /// Only partially received.
    Partial = 3,
    /// No file was submitted.
    NoFile = 4,
    /// No temporary directory available.
    NoTmpDir = 6,
    /// Failed to write to disk.
    CantWrite = 7,
    /// Rejected by an extension.
    Extension = 8,
}

impl UploadErrorCode {
    /// Map a raw code to its variant.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UnknownCode`] for unassigned codes.
    pub fn from_code(code: u8) -> Result<Self, UploadError> {
        Ok(match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return Err(UploadError::UnknownCode(code)),
        })
    }

    /// Returns `true` for [`UploadErrorCode::Ok`].
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Clone)]
enum Source {
    TempFile(PathBuf),
    Stream(Stream),
    None,
}

/// A file received through an upload, movable to its final location
/// exactly once.
#[derive(Clone)]
pub struct UploadedFile {
    source: Source,
    size: Option<u64>,
    error: UploadErrorCode,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: bool,
}

impl UploadedFile {
    /// Create an uploaded file backed by a temporary file on disk.
    pub fn from_temp_file(
        path: impl Into<PathBuf>,
        size: Option<u64>,
        error: UploadErrorCode,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        let source = match error.is_ok() {
            true => Source::TempFile(path.into()),
            false => Source::None,
        };
        Self {
            source,
            size,
            error,
            client_filename,
            client_media_type,
            moved: false,
        }
    }

    /// Create an uploaded file backed by an in-memory or wrapped stream.
    pub fn from_stream(
        stream: Stream,
        size: Option<u64>,
        error: UploadErrorCode,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        let source = match error.is_ok() {
            true => Source::Stream(stream),
            false => Source::None,
        };
        Self {
            source,
            size,
            error,
            client_filename,
            client_media_type,
            moved: false,
        }
    }

    /// Returns the size reported by the client, if any.
    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns the upload outcome code.
    #[inline]
    pub fn error(&self) -> UploadErrorCode {
        self.error
    }

    /// Returns the filename reported by the client.
    ///
    /// Untrusted input, never use it as a disk path.
    #[inline]
    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    /// Returns the media type reported by the client.
    #[inline]
    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    /// Returns a stream over the uploaded content.
    ///
    /// # Errors
    ///
    /// Fails once the file has been moved, when the upload did not
    /// complete, or when the temporary file cannot be opened.
    pub fn stream(&self) -> Result<Stream, UploadError> {
        if self.moved {
            return Err(UploadError::AlreadyMoved);
        }
        match &self.source {
            Source::TempFile(path) => {
                let file = fs::File::open(path).map_err(UploadError::Move)?;
                Ok(Stream::from_file(file, Mode::Read))
            }
            Source::Stream(stream) => Ok(stream.clone()),
            Source::None => Err(UploadError::Failed(self.error)),
        }
    }

    /// Move the uploaded content to `target`.
    ///
    /// This is a one-shot operation. A rename is attempted first, then
    /// a copy and remove for cross-device targets.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::AlreadyMoved`] on a second call,
    /// [`UploadError::InvalidTarget`] for an empty target path and
    /// [`UploadError::Move`] when the filesystem rejects the transfer.
    pub fn move_to(&mut self, target: impl AsRef<Path>) -> Result<(), UploadError> {
        let target = target.as_ref();
        if self.moved {
            return Err(UploadError::AlreadyMoved);
        }
        if target.as_os_str().is_empty() {
            return Err(UploadError::InvalidTarget);
        }
        match &self.source {
            Source::TempFile(path) => {
                if fs::rename(path, target).is_err() {
                    fs::copy(path, target).map_err(UploadError::Move)?;
                    fs::remove_file(path).map_err(UploadError::Move)?;
                }
            }
            Source::Stream(stream) => {
                stream
                    .rewind()
                    .map_err(|err| UploadError::Move(io::Error::other(err)))?;
                let content = stream
                    .get_contents()
                    .map_err(|err| UploadError::Move(io::Error::other(err)))?;
                let mut file = fs::File::create(target).map_err(UploadError::Move)?;
                file.write_all(&content).map_err(UploadError::Move)?;
            }
            Source::None => return Err(UploadError::Failed(self.error)),
        }
        self.moved = true;
        Ok(())
    }
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("size", &self.size)
            .field("error", &self.error)
            .field("client_filename", &self.client_filename)
            .field("client_media_type", &self.client_media_type)
            .field("moved", &self.moved)
            .finish_non_exhaustive()
    }
}

// ===== Error =====

/// Error when reading or moving an uploaded file.
pub enum UploadError {
    /// The file has already been moved.
    AlreadyMoved,
    /// The target path is empty.
    InvalidTarget,
    /// The upload itself did not complete.
    Failed(UploadErrorCode),
    /// Unassigned upload outcome code.
    UnknownCode(u8),
    /// Filesystem error while transferring the content.
    Move(io::Error),
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Move(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyMoved => f.write_str("uploaded file has already been moved"),
            Self::InvalidTarget => f.write_str("invalid move target path"),
            Self::Failed(code) => write!(f, "upload did not complete ({code:?})"),
            Self::UnknownCode(code) => write!(f, "unknown upload error code {code}"),
            Self::Move(err) => write!(f, "failed to move uploaded file: {err}"),
        }
    }
}

impl std::fmt::Debug for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("busta-upload-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(UploadErrorCode::from_code(0).unwrap(), UploadErrorCode::Ok);
        assert_eq!(UploadErrorCode::from_code(4).unwrap(), UploadErrorCode::NoFile);
        assert!(UploadErrorCode::from_code(5).is_err());
        assert!(UploadErrorCode::from_code(9).is_err());
    }

    #[test]
    fn test_move_temp_file() {
        let source = temp("move-src");
        let target = temp("move-dst");
        fs::write(&source, b"payload").unwrap();

        let mut uploaded = UploadedFile::from_temp_file(
            &source,
            Some(7),
            UploadErrorCode::Ok,
            Some("report.txt".into()),
            Some("text/plain".into()),
        );
        uploaded.move_to(&target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"payload");
        assert!(!source.exists());

        // second move is rejected
        assert!(matches!(uploaded.move_to(&target), Err(UploadError::AlreadyMoved)));
        assert!(matches!(uploaded.stream(), Err(UploadError::AlreadyMoved)));

        fs::remove_file(&target).unwrap();
    }

    #[test]
    fn test_move_stream_backed() {
        let target = temp("stream-dst");
        let mut uploaded = UploadedFile::from_stream(
            Stream::from("in memory"),
            Some(9),
            UploadErrorCode::Ok,
            None,
            None,
        );
        uploaded.move_to(&target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"in memory");
        fs::remove_file(&target).unwrap();
    }

    #[test]
    fn test_empty_target_rejected() {
        let mut uploaded = UploadedFile::from_stream(
            Stream::from("x"),
            None,
            UploadErrorCode::Ok,
            None,
            None,
        );
        assert!(matches!(uploaded.move_to(""), Err(UploadError::InvalidTarget)));
    }

    #[test]
    fn test_failed_upload_has_no_source() {
        let mut uploaded = UploadedFile::from_temp_file(
            "/nonexistent",
            None,
            UploadErrorCode::Partial,
            Some("half.bin".into()),
            None,
        );
        assert!(matches!(uploaded.stream(), Err(UploadError::Failed(UploadErrorCode::Partial))));
        assert!(matches!(uploaded.move_to("/tmp/x"), Err(UploadError::Failed(_))));
    }
}
