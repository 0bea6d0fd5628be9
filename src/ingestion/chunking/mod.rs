
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DocQaError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_OVERLAP: usize = 50;

/// Configuration for positional chunking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length in characters
    pub chunk_size: usize,
    /// Characters shared between a chunk and its successor
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Check that every window advances past the previous start
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(DocQaError::Configuration(
                "chunk size must be greater than 0".to_string(),
            ));
        }

        if self.overlap >= self.chunk_size {
            return Err(DocQaError::Configuration(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }

        Ok(())
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }
}

/// Split text into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one.
///
/// Lengths are counted in `char`s. The last window may be shorter than
/// `chunk_size`. Empty text produces no chunks.
///
/// # Errors
///
/// Returns [`DocQaError::Configuration`] when `chunk_size` is zero or
/// `overlap >= chunk_size`.
#[inline]
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    let config = ChunkingConfig {
        chunk_size,
        overlap,
    };
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let stride = config.stride();
    let mut chunks = Vec::with_capacity(chars.len().div_ceil(stride));

    let mut start = 0;
    while start < chars.len() {
        let end = start.saturating_add(chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect::<String>());
        start = start.saturating_add(stride);
    }

    debug!(
        "Split {} characters into {} chunks (size {}, overlap {})",
        chars.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(chunks)
}
