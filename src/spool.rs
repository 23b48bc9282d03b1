//! Memory-then-disk spooled buffers for downloaded asset bodies.
//!
//! A [`SpooledBuffer`] starts out as an in-memory vector. Once the bytes
//! written to it would exceed its threshold, the contents move to a named
//! temporary file and every later write goes to disk. After writing, callers
//! [`rewind`](SpooledBuffer::rewind) and read it back through [`AsyncRead`],
//! then [`close`](SpooledBuffer::close) it to delete any backing file.
//!
//! # Example
//!
//! ```
//! use dcbot_core::spool::Spooler;
//! use tokio::io::AsyncReadExt;
//!
//! # async fn example() -> std::io::Result<()> {
//! let spooler = Spooler::new(None);
//! let mut buffer = spooler.buffer(1024);
//! buffer.write_all(b"hello").await?;
//! buffer.rewind().await?;
//!
//! let mut contents = Vec::new();
//! buffer.read_to_end(&mut contents).await?;
//! assert_eq!(contents, b"hello");
//! buffer.close()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io::{self, Cursor, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt, ReadBuf};
use tracing::{debug, instrument};

/// Filename prefix of spill files.
pub const SPOOL_FILE_PREFIX: &str = "dcbot-spool-";

/// Allocator of [`SpooledBuffer`]s.
///
/// Holds the directory spill files are created in; `None` uses the OS
/// temporary directory.
#[derive(Debug, Clone, Default)]
pub struct Spooler {
    dir: Option<PathBuf>,
}

impl Spooler {
    /// Creates an allocator that spills into `dir` (or the OS temp dir).
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Returns the configured spill directory.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Allocates an empty buffer that stays in memory up to `threshold` bytes.
    #[must_use]
    pub fn buffer(&self, threshold: usize) -> SpooledBuffer {
        SpooledBuffer {
            threshold,
            dir: self.dir.clone(),
            len: 0,
            storage: Storage::Memory(Cursor::new(Vec::new())),
        }
    }
}

enum Storage {
    Memory(Cursor<Vec<u8>>),
    Disk { file: File, path: TempPath },
}

/// Write-then-read byte container backed by memory or a temporary file.
///
/// The backing file, if any, is deleted by [`close`](Self::close), or on drop
/// when the buffer is discarded without closing.
pub struct SpooledBuffer {
    threshold: usize,
    dir: Option<PathBuf>,
    len: u64,
    storage: Storage,
}

impl fmt::Debug for SpooledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpooledBuffer")
            .field("threshold", &self.threshold)
            .field("len", &self.len)
            .field("path", &self.path())
            .finish()
    }
}

impl SpooledBuffer {
    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// In-memory threshold this buffer was allocated with.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns whether the contents have moved to disk.
    #[must_use]
    pub fn is_spilled(&self) -> bool {
        matches!(self.storage, Storage::Disk { .. })
    }

    /// Path of the backing file, when disk-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Memory(_) => None,
            Storage::Disk { path, .. } => Some(path),
        }
    }

    /// Appends `data`, spilling to disk first if it would cross the threshold.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the spill file cannot be created or written.
    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if let Storage::Memory(cursor) = &self.storage
            && cursor.get_ref().len().saturating_add(data.len()) > self.threshold
        {
            self.spill().await?;
        }

        match &mut self.storage {
            Storage::Memory(cursor) => Write::write_all(cursor, data)?,
            Storage::Disk { file, .. } => file.write_all(data).await?,
        }
        self.len += data.len() as u64;
        Ok(())
    }

    /// Moves the in-memory contents to a new temporary file.
    #[instrument(level = "debug", skip(self), fields(len = self.len))]
    async fn spill(&mut self) -> io::Result<()> {
        let dir = self.dir.clone();
        let named = tokio::task::spawn_blocking(move || {
            let mut builder = tempfile::Builder::new();
            builder.prefix(SPOOL_FILE_PREFIX);
            match dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }
        })
        .await
        .map_err(io::Error::other)??;

        let (std_file, path) = named.into_parts();
        let mut file = File::from_std(std_file);
        if let Storage::Memory(cursor) = &self.storage {
            // On failure `path` drops here and the half-written file is removed
            file.write_all(cursor.get_ref()).await?;
        }
        debug!(path = %path.display(), "spilled buffer to disk");
        self.storage = Storage::Disk { file, path };
        Ok(())
    }

    /// Seeks back to the first byte so the contents can be read.
    ///
    /// # Errors
    ///
    /// Returns an IO error if flushing or seeking the spill file fails.
    pub async fn rewind(&mut self) -> io::Result<()> {
        match &mut self.storage {
            Storage::Memory(cursor) => cursor.set_position(0),
            Storage::Disk { file, .. } => {
                file.flush().await?;
                file.seek(SeekFrom::Start(0)).await?;
            }
        }
        Ok(())
    }

    /// Releases the buffer, deleting its backing file if there is one.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the backing file cannot be removed.
    pub fn close(self) -> io::Result<()> {
        match self.storage {
            Storage::Memory(_) => Ok(()),
            Storage::Disk { file, path } => {
                drop(file);
                debug!(path = %path.display(), "removing spool file");
                path.close()
            }
        }
    }
}

impl AsyncRead for SpooledBuffer {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().storage {
            Storage::Memory(cursor) => Pin::new(cursor).poll_read(cx, buf),
            Storage::Disk { file, .. } => Pin::new(file).poll_read(cx, buf),
        }
    }
}
