//! Seekable byte stream used as message body.
//!
//! [`Stream`] is a shared handle over a memory buffer or an open file.
//! Cloning shares the backing store and the cursor, which is what gives
//! messages reference semantics over their body: a body handed to a
//! message must not have its cursor moved by the caller afterwards.
//!
//! # Seek Policy
//!
//! Memory-backed streams clamp every seek to `[0, len]`. File-backed
//! streams delegate to the OS and surface a rejected seek as
//! [`StreamError::Seek`].

mod error;

#[cfg(test)]
mod test;

pub use error::StreamError;

use bytes::Bytes;
use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Capability of a file-backed stream, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
    ReadWrite,
}

impl Mode {
    const fn readable(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    const fn writable(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// Seekable, readable and writable byte stream.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    readable: bool,
    writable: bool,
    repr: Repr,
}

enum Repr {
    Memory {
        buf: Vec<u8>,
        /// always within `0..=buf.len()`
        pos: usize,
    },
    File(File),
    Closed,
}

// ===== Construction =====

impl Stream {
    /// Create a read-write memory stream over the given bytes.
    ///
    /// The cursor starts at position `0`.
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self::memory(contents.into(), true, true)
    }

    /// Create an empty read-write memory stream.
    #[inline]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Create a read-only memory stream over the given bytes.
    pub fn read_only(contents: impl Into<Vec<u8>>) -> Self {
        Self::memory(contents.into(), true, false)
    }

    /// Create a stream over an open file.
    ///
    /// Capabilities are taken from `mode`, which must match how the file
    /// was opened.
    pub fn from_file(file: File, mode: Mode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                readable: mode.readable(),
                writable: mode.writable(),
                repr: Repr::File(file),
            })),
        }
    }

    fn memory(buf: Vec<u8>, readable: bool, writable: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                readable,
                writable,
                repr: Repr::Memory { buf, pos: 0 },
            })),
        }
    }

    /// Returns `true` if both handles share the same backing stream.
    #[inline]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ===== Capability =====

impl Stream {
    /// Returns `true` if the stream can be read.
    pub fn is_readable(&self) -> bool {
        let inner = self.lock();
        inner.readable && !matches!(inner.repr, Repr::Closed)
    }

    /// Returns `true` if the stream can be written.
    pub fn is_writable(&self) -> bool {
        let inner = self.lock();
        inner.writable && !matches!(inner.repr, Repr::Closed)
    }

    /// Returns `true` if the cursor can be moved.
    pub fn is_seekable(&self) -> bool {
        !matches!(self.lock().repr, Repr::Closed)
    }

    /// Returns a snapshot of the capability flags and the size.
    ///
    /// The size is [`None`] when the stream is closed or the backing
    /// resource cannot report it.
    pub fn metadata(&self) -> Metadata {
        let inner = self.lock();
        let closed = matches!(inner.repr, Repr::Closed);
        let size = match &inner.repr {
            Repr::Memory { buf, .. } => Some(buf.len() as u64),
            Repr::File(file) => file.metadata().ok().map(|meta| meta.len()),
            Repr::Closed => None,
        };
        Metadata {
            readable: inner.readable && !closed,
            writable: inner.writable && !closed,
            seekable: !closed,
            size,
        }
    }
}

/// Point-in-time view of a stream's capabilities and size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub readable: bool,
    pub writable: bool,
    pub seekable: bool,
    pub size: Option<u64>,
}

// ===== Cursor =====

impl Stream {
    /// Move the cursor.
    ///
    /// Memory streams clamp the target to `[0, len]`; file streams
    /// propagate the OS result.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Closed`] after close or detach, and
    /// [`StreamError::Seek`] when a file-backed seek is rejected.
    pub fn seek(&self, target: SeekFrom) -> Result<(), StreamError> {
        match &mut self.lock().repr {
            Repr::Memory { buf, pos } => {
                let base = match target {
                    SeekFrom::Start(offset) => offset as i128,
                    SeekFrom::Current(offset) => *pos as i128 + offset as i128,
                    SeekFrom::End(offset) => buf.len() as i128 + offset as i128,
                };
                *pos = base.clamp(0, buf.len() as i128) as usize;
                Ok(())
            }
            Repr::File(file) => {
                file.seek(target).map_err(StreamError::Seek)?;
                Ok(())
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }

    /// Returns the current cursor position.
    pub fn tell(&self) -> Result<u64, StreamError> {
        match &mut self.lock().repr {
            Repr::Memory { pos, .. } => Ok(*pos as u64),
            Repr::File(file) => file.stream_position().map_err(StreamError::Seek),
            Repr::Closed => Err(StreamError::Closed),
        }
    }

    /// Move the cursor to the start.
    #[inline]
    pub fn rewind(&self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0))
    }

    /// Move the cursor to the end.
    #[inline]
    pub fn end(&self) -> Result<(), StreamError> {
        self.seek(SeekFrom::End(0))
    }

    /// Returns the total stream length in bytes.
    pub fn size(&self) -> Result<u64, StreamError> {
        match &self.lock().repr {
            Repr::Memory { buf, .. } => Ok(buf.len() as u64),
            Repr::File(file) => Ok(file.metadata()?.len()),
            Repr::Closed => Err(StreamError::Closed),
        }
    }

    /// Returns `true` when the cursor is at or past the end.
    pub fn eof(&self) -> Result<bool, StreamError> {
        match &mut self.lock().repr {
            Repr::Memory { buf, pos } => Ok(*pos >= buf.len()),
            Repr::File(file) => {
                let at = file.stream_position().map_err(StreamError::Seek)?;
                Ok(at >= file.metadata()?.len())
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }
}

// ===== Read / Write =====

impl Stream {
    /// Read up to `len` bytes from the cursor, advancing it by the amount
    /// actually read. Returns empty bytes at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NotReadable`] on a write-only stream and
    /// [`StreamError::Closed`] after close or detach.
    pub fn read(&self, len: usize) -> Result<Bytes, StreamError> {
        let mut inner = self.lock();
        if !inner.readable {
            return match inner.repr {
                Repr::Closed => Err(StreamError::Closed),
                _ => Err(StreamError::NotReadable),
            };
        }
        match &mut inner.repr {
            Repr::Memory { buf, pos } => {
                let end = buf.len().min(pos.saturating_add(len));
                let chunk = Bytes::copy_from_slice(&buf[*pos..end]);
                *pos = end;
                Ok(chunk)
            }
            Repr::File(file) => {
                let mut chunk = Vec::with_capacity(len);
                file.take(len as u64).read_to_end(&mut chunk)?;
                Ok(chunk.into())
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }

    /// Write bytes at the cursor, advancing it past the written data.
    ///
    /// Within the current length this overwrites in place; past it the
    /// stream grows. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NotWritable`] on a read-only stream and
    /// [`StreamError::Closed`] after close or detach.
    pub fn write(&self, data: &[u8]) -> Result<usize, StreamError> {
        let mut inner = self.lock();
        if !inner.writable {
            return match inner.repr {
                Repr::Closed => Err(StreamError::Closed),
                _ => Err(StreamError::NotWritable),
            };
        }
        match &mut inner.repr {
            Repr::Memory { buf, pos } => {
                let end = *pos + data.len();
                if end > buf.len() {
                    buf.resize(end, 0);
                }
                buf[*pos..end].copy_from_slice(data);
                *pos = end;
                Ok(data.len())
            }
            Repr::File(file) => {
                file.write_all(data)?;
                Ok(data.len())
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }

    /// Read everything from the cursor to the end, advancing the cursor
    /// to the end.
    pub fn get_contents(&self) -> Result<Bytes, StreamError> {
        let mut inner = self.lock();
        if !inner.readable {
            return match inner.repr {
                Repr::Closed => Err(StreamError::Closed),
                _ => Err(StreamError::NotReadable),
            };
        }
        match &mut inner.repr {
            Repr::Memory { buf, pos } => {
                let chunk = Bytes::copy_from_slice(&buf[*pos..]);
                *pos = buf.len();
                Ok(chunk)
            }
            Repr::File(file) => {
                let mut chunk = Vec::new();
                file.read_to_end(&mut chunk)?;
                Ok(chunk.into())
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }
}

// ===== Search / Insert =====

impl Stream {
    /// Find `needle` scanning from the current cursor.
    ///
    /// Returns the absolute offset of the first occurrence, or [`None`]
    /// when absent. The cursor is restored after scanning.
    pub fn search(&self, needle: &[u8]) -> Result<Option<u64>, StreamError> {
        let mut inner = self.lock();
        if !inner.readable {
            return match inner.repr {
                Repr::Closed => Err(StreamError::Closed),
                _ => Err(StreamError::NotReadable),
            };
        }
        match &mut inner.repr {
            Repr::Memory { buf, pos } => Ok(find(&buf[*pos..], needle).map(|at| (*pos + at) as u64)),
            Repr::File(file) => {
                let saved = file.stream_position().map_err(StreamError::Seek)?;
                let mut rest = Vec::new();
                file.read_to_end(&mut rest)?;
                file.seek(SeekFrom::Start(saved)).map_err(StreamError::Seek)?;
                Ok(find(&rest, needle).map(|at| saved + at as u64))
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }

    /// Insert `text` immediately before the first occurrence of `anchor`.
    ///
    /// Returns `false` without touching the stream when the anchor is not
    /// found. The cursor is left where it was. Backs template-style
    /// placeholder substitution on a body buffer.
    pub fn prepend(&self, text: &[u8], anchor: &[u8]) -> Result<bool, StreamError> {
        match self.search(anchor)? {
            Some(at) => {
                self.insert(at, text)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Insert `text` immediately after the first occurrence of `anchor`.
    ///
    /// Returns `false` without touching the stream when the anchor is not
    /// found. The cursor is left where it was.
    pub fn postpend(&self, text: &[u8], anchor: &[u8]) -> Result<bool, StreamError> {
        match self.search(anchor)? {
            Some(at) => {
                self.insert(at + anchor.len() as u64, text)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert(&self, at: u64, text: &[u8]) -> Result<(), StreamError> {
        let mut inner = self.lock();
        if !inner.writable {
            return match inner.repr {
                Repr::Closed => Err(StreamError::Closed),
                _ => Err(StreamError::NotWritable),
            };
        }
        match &mut inner.repr {
            Repr::Memory { buf, .. } => {
                let at = (at as usize).min(buf.len());
                buf.splice(at..at, text.iter().copied());
                Ok(())
            }
            Repr::File(file) => {
                let saved = file.stream_position().map_err(StreamError::Seek)?;
                file.seek(SeekFrom::Start(0)).map_err(StreamError::Seek)?;
                let mut whole = Vec::new();
                file.read_to_end(&mut whole)?;
                let at = (at as usize).min(whole.len());
                whole.splice(at..at, text.iter().copied());
                file.seek(SeekFrom::Start(0)).map_err(StreamError::Seek)?;
                file.write_all(&whole)?;
                file.seek(SeekFrom::Start(saved)).map_err(StreamError::Seek)?;
                Ok(())
            }
            Repr::Closed => Err(StreamError::Closed),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ===== Release =====

impl Stream {
    /// Close the stream. Every later operation fails with
    /// [`StreamError::Closed`].
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.readable = false;
        inner.writable = false;
        inner.repr = Repr::Closed;
    }

    /// Hand off the backing file, leaving the stream closed.
    ///
    /// Memory streams have no detachable resource and yield [`None`];
    /// they are still left closed.
    pub fn detach(&self) -> Option<File> {
        let mut inner = self.lock();
        inner.readable = false;
        inner.writable = false;
        match std::mem::replace(&mut inner.repr, Repr::Closed) {
            Repr::File(file) => Some(file),
            Repr::Memory { .. } | Repr::Closed => None,
        }
    }
}

// ===== Format =====

/// Full contents from the start, without moving the cursor.
///
/// Falls back to the empty string when the stream is closed or the
/// backing resource fails.
impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut inner = self.lock();
        if !inner.readable {
            return Ok(());
        }
        match &mut inner.repr {
            Repr::Memory { buf, .. } => f.write_str(&String::from_utf8_lossy(buf)),
            Repr::File(file) => {
                let Ok(saved) = file.stream_position() else {
                    return Ok(());
                };
                let mut whole = Vec::new();
                let restored = file.seek(SeekFrom::Start(0)).is_ok()
                    && file.read_to_end(&mut whole).is_ok()
                    && file.seek(SeekFrom::Start(saved)).is_ok();
                if restored {
                    f.write_str(&String::from_utf8_lossy(&whole))?;
                }
                Ok(())
            }
            Repr::Closed => Ok(()),
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let inner = self.lock();
        let mut out = f.debug_struct("Stream");
        match &inner.repr {
            Repr::Memory { buf, pos } => out.field("len", &buf.len()).field("pos", pos),
            Repr::File(_) => out.field("file", &".."),
            Repr::Closed => out.field("closed", &true),
        }
        .finish()
    }
}

impl From<&str> for Stream {
    #[inline]
    fn from(contents: &str) -> Self {
        Self::new(contents.as_bytes().to_vec())
    }
}

impl From<String> for Stream {
    #[inline]
    fn from(contents: String) -> Self {
        Self::new(contents.into_bytes())
    }
}

impl From<Bytes> for Stream {
    #[inline]
    fn from(contents: Bytes) -> Self {
        Self::new(contents.to_vec())
    }
}

impl Default for Stream {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}
