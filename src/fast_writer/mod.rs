//! Streaming output engine
//!
//! This module turns the table model into the ODS package:
//! - [`Flusher`] units render finished pieces of XML
//! - [`FlushQueue`] applies them in order, on a background thread or inline
//! - [`ZipSink`] implementations receive the bytes entry by entry

pub mod elements;
pub mod flush_queue;
pub mod flusher;
pub mod memory;
pub mod xml_writer;
pub mod zip_sink;

pub use elements::{AutoFilter, DocumentMeta, Settings};
pub use flush_queue::FlushQueue;
pub use flusher::Flusher;
pub use memory::{FlushMode, MemoryProfile, StylesMode, WriterConfig};
pub use zip_sink::{MemoryArchive, MemorySink, SZipSink, SinkFactory, ZipSink};
