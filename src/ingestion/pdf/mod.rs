#[cfg(test)]
mod tests;

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{DocQaError, Result};

/// Source of plain text for a single document
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of the document at `path`, pages in order
    fn extract_text(&self, path: &Path) -> Result<String>;

    /// Whether this extractor handles the given file
    fn can_extract(&self, path: &Path) -> bool;
}

/// Extracts text from PDF files with `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    #[inline]
    fn extract_text(&self, path: &Path) -> Result<String> {
        debug!("Extracting text from {}", path.display());

        // pdf-extract panics on some malformed fonts and encodings
        let text = match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path))) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                return Err(DocQaError::Extraction {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(payload) => {
                return Err(DocQaError::Extraction {
                    path: path.to_path_buf(),
                    message: format!("PDF parser panicked: {}", panic_message(payload.as_ref())),
                });
            }
        };

        debug!(
            "Extracted {} characters from {}",
            text.chars().count(),
            path.display()
        );
        Ok(text)
    }

    #[inline]
    fn can_extract(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown error"
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}

/// List the files in `source_dir` that `extractor` can handle.
///
/// Only the top level of the directory is scanned. Results are sorted by
/// path so documents are always encountered in the same order. A missing
/// directory yields an empty list.
#[inline]
pub fn discover_documents(source_dir: &Path, extractor: &dyn TextExtractor) -> Result<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        warn!(
            "Source directory {} does not exist or is not a directory",
            source_dir.display()
        );
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let path = entry?.path();
        if path.is_file() && extractor.can_extract(&path) {
            documents.push(path);
        } else {
            debug!("Skipping non-document entry {}", path.display());
        }
    }
    documents.sort();

    debug!(
        "Discovered {} documents in {}",
        documents.len(),
        source_dir.display()
    );
    Ok(documents)
}
