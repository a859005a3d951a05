use std::io;

/// A possible error value when operating on a [`Stream`][super::Stream].
pub enum StreamError {
    /// Stream was opened without read capability.
    NotReadable,
    /// Stream was opened without write capability.
    NotWritable,
    /// The backing resource rejected the seek.
    Seek(io::Error),
    /// Stream was closed or detached.
    Closed,
    /// Read or write on the backing resource failed.
    Io(io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotReadable => f.write_str("stream is not readable"),
            Self::NotWritable => f.write_str("stream is not writable"),
            Self::Seek(err) => write!(f, "stream seek failed: {err}"),
            Self::Closed => f.write_str("stream is closed"),
            Self::Io(err) => write!(f, "stream io failed: {err}"),
        }
    }
}

impl std::fmt::Debug for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Seek(err) | Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StreamError {
    #[inline]
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
