//! ZIP output sinks consumed by flushers
//!
//! A sink is an ordered byte stream split into named entries. Flushers start an
//! entry, write XML through [`std::io::Write`], and the final flusher closes the
//! archive with [`ZipSink::finish`].

use crate::error::{OdsError, Result};
use indexmap::IndexMap;
use s_zip::StreamingZipWriter;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Streaming ZIP container: entries are written sequentially, never revisited.
///
/// A sink lives on the thread that drains the flush queue. Sinks that can't be
/// moved across threads are built there by a [`SinkFactory`].
pub trait ZipSink: Write {
    /// Close the current entry (if any) and open a new one
    fn start_entry(&mut self, name: &str) -> Result<()>;

    /// Write the central directory and release the output
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Builds the sink on the thread that will write to it
pub type SinkFactory = Box<dyn FnOnce() -> Result<Box<dyn ZipSink>> + Send>;

/// File sink backed by s-zip's streaming compressor
pub struct SZipSink {
    zip: StreamingZipWriter<File>,
}

impl SZipSink {
    /// Create the archive at `path`. Compression level is clamped to 0..=9.
    pub fn create<P: AsRef<Path>>(path: P, compression_level: u32) -> Result<Self> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            OdsError::Config(format!("path is not valid UTF-8: {:?}", path.as_ref()))
        })?;
        let zip = StreamingZipWriter::with_compression(path_str, compression_level.min(9))?;
        Ok(SZipSink { zip })
    }

    /// Factory creating the archive at `path` when called
    pub fn factory<P: AsRef<Path>>(path: P, compression_level: u32) -> SinkFactory {
        let path = path.as_ref().to_path_buf();
        Box::new(move || -> Result<Box<dyn ZipSink>> {
            Ok(Box::new(SZipSink::create(&path, compression_level)?))
        })
    }
}

impl Write for SZipSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.zip
            .write_data(buf)
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ZipSink for SZipSink {
    fn start_entry(&mut self, name: &str) -> Result<()> {
        self.zip.start_entry(name)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        self.zip.finish()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ArchiveState {
    entries: IndexMap<String, Vec<u8>>,
    finished: bool,
}

/// In-memory archive, readable while (and after) a [`MemorySink`] writes to it
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    state: Arc<Mutex<ArchiveState>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that appends to this archive
    pub fn sink(&self) -> MemorySink {
        MemorySink {
            state: Arc::clone(&self.state),
            current: None,
        }
    }

    /// Factory returning a new [`MemorySink`] of this archive
    pub fn factory(&self) -> SinkFactory {
        let sink = self.sink();
        Box::new(move || -> Result<Box<dyn ZipSink>> { Ok(Box::new(sink)) })
    }

    fn lock(&self) -> MutexGuard<'_, ArchiveState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Entry names in write order
    pub fn entry_names(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    pub fn entry(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(name).cloned()
    }

    pub fn entry_string(&self, name: &str) -> Option<String> {
        self.entry(name)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// True once the writer called [`ZipSink::finish`]
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }
}

/// Sink half of a [`MemoryArchive`]
pub struct MemorySink {
    state: Arc<Mutex<ArchiveState>>,
    current: Option<String>,
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let name = self
            .current
            .as_ref()
            .ok_or_else(|| io::Error::other("no ZIP entry started"))?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .entries
            .entry(name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ZipSink for MemorySink {
    fn start_entry(&mut self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.entries.insert(name.to_string(), Vec::new());
        self.current = Some(name.to_string());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.finished = true;
        Ok(())
    }
}
