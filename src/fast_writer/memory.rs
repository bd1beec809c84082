//! Writer configuration and memory profiles

use crate::error::{OdsError, Result};

/// Largest supported column capacity
pub const MAX_COLUMN_CAPACITY: u32 = 16_384;

/// Who applies the flushers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// A dedicated thread writes the archive while the caller keeps producing rows
    #[default]
    Background,
    /// Flushers are written on the caller's thread
    Inline,
}

/// When the style registry is frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StylesMode {
    /// Freeze at the first row batch; rows stream out immediately
    #[default]
    Streaming,
    /// Keep every flusher until `save()`, so styles can be added at any time
    Buffered,
}

/// Memory profile for different deployment sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryProfile {
    /// Small containers (< 512MB): flush every 128 closed rows
    Low,
    /// Medium containers (512MB-1GB): flush every 512 closed rows
    Medium,
    /// Large containers (> 1GB): flush every 1024 closed rows (default)
    High,
    Custom { row_batch_size: usize },
}

impl MemoryProfile {
    /// Pick a profile from a memory limit in MB
    pub fn from_memory_mb(memory_mb: usize) -> Self {
        if memory_mb < 512 {
            MemoryProfile::Low
        } else if memory_mb < 1024 {
            MemoryProfile::Medium
        } else {
            MemoryProfile::High
        }
    }

    /// Detect from the `MEMORY_LIMIT_MB` environment variable
    pub fn from_env() -> Self {
        std::env::var("MEMORY_LIMIT_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(Self::from_memory_mb)
            .unwrap_or(MemoryProfile::High)
    }

    /// Number of closed rows gathered before a row batch is enqueued
    pub fn row_batch_size(&self) -> usize {
        match self {
            MemoryProfile::Low => 128,
            MemoryProfile::Medium => 512,
            MemoryProfile::High => 1024,
            MemoryProfile::Custom { row_batch_size } => *row_batch_size,
        }
    }
}

/// Everything an [`OdsDocument`](crate::OdsDocument) needs to know up front
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    pub flush_mode: FlushMode,
    pub styles_mode: StylesMode,
    pub row_batch_size: usize,
    pub column_capacity: u32,
    /// Deflate level, 0 to 9
    pub compression_level: u32,
    pub creator: String,
    pub generator: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            flush_mode: FlushMode::default(),
            styles_mode: StylesMode::default(),
            row_batch_size: MemoryProfile::High.row_batch_size(),
            column_capacity: 1024,
            compression_level: 6,
            creator: "fastods".to_string(),
            generator: format!("fastods/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl WriterConfig {
    /// Default configuration with the batch size of `profile`
    pub fn from_profile(profile: MemoryProfile) -> Self {
        WriterConfig {
            row_batch_size: profile.row_batch_size(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_batch_size == 0 {
            return Err(OdsError::Config("row_batch_size must be at least 1".to_string()));
        }
        if self.column_capacity == 0 || self.column_capacity > MAX_COLUMN_CAPACITY {
            return Err(OdsError::Config(format!(
                "column_capacity must be between 1 and {}, got {}",
                MAX_COLUMN_CAPACITY, self.column_capacity
            )));
        }
        Ok(())
    }

    /// Compression level clamped to the deflate range
    pub fn effective_compression_level(&self) -> u32 {
        self.compression_level.min(9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_profile_from_mb() {
        assert_eq!(MemoryProfile::from_memory_mb(256), MemoryProfile::Low);
        assert_eq!(MemoryProfile::from_memory_mb(768), MemoryProfile::Medium);
        assert_eq!(MemoryProfile::from_memory_mb(2048), MemoryProfile::High);
    }

    #[test]
    fn test_profile_batch_sizes() {
        assert_eq!(MemoryProfile::Low.row_batch_size(), 128);
        assert_eq!(
            WriterConfig::from_profile(MemoryProfile::Custom { row_batch_size: 7 }).row_batch_size,
            7
        );
    }

    #[test]
    fn test_config_validation() {
        let config = WriterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.row_batch_size, 1024);
        assert_eq!(config.flush_mode, FlushMode::Background);
        assert_eq!(config.styles_mode, StylesMode::Streaming);

        let bad = WriterConfig {
            row_batch_size: 0,
            ..WriterConfig::default()
        };
        assert!(matches!(bad.validate(), Err(OdsError::Config(_))));

        let bad = WriterConfig {
            column_capacity: MAX_COLUMN_CAPACITY + 1,
            ..WriterConfig::default()
        };
        assert!(bad.validate().is_err());

        let loud = WriterConfig {
            compression_level: 42,
            ..WriterConfig::default()
        };
        assert_eq!(loud.effective_compression_level(), 9);
    }
}
