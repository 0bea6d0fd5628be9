// Shared fakes for integration tests

#![allow(dead_code, reason = "each integration test binary uses a subset")]

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use doc_qa::embeddings::{Embedder, Embedding};
use doc_qa::generation::Generator;
use doc_qa::ingestion::TextExtractor;
use doc_qa::{DocQaError, Result};

/// Bag-of-letters embedding: 26 lowercase ASCII letter counts
#[derive(Debug, Default)]
pub struct LetterEmbedder {
    pub calls: AtomicUsize,
}

impl Embedder for LetterEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; 26];
                for c in text.chars().filter(char::is_ascii_alphabetic) {
                    vector[usize::from(c.to_ascii_lowercase() as u8 - b'a')] += 1.0;
                }
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "letters"
    }
}

/// Answers with the first context line after the "Context:" heading
#[derive(Debug, Default)]
pub struct EchoContextGenerator {
    pub prompts: Mutex<Vec<String>>,
}

impl Generator for EchoContextGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        let answer = prompt
            .split_once("Context:\n")
            .and_then(|(_, rest)| rest.lines().next())
            .unwrap_or("Not available");
        Ok(answer.to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

/// Treats `.pdf` files as UTF-8 text; a file starting with `%PDF` is unreadable
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)?;
        if text.starts_with("%PDF") {
            return Err(DocQaError::Extraction {
                path: path.to_path_buf(),
                message: "binary document".to_string(),
            });
        }
        Ok(text)
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

/// Write `documents` into `dir`, creating it first
pub fn write_documents(dir: &Path, documents: &[(&str, &str)]) {
    fs::create_dir_all(dir).expect("should create document dir");
    for (name, content) in documents {
        fs::write(dir.join(name), content).expect("should write document");
    }
}
