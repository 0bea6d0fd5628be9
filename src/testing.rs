// Deterministic collaborators for unit tests

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embeddings::{Embedder, Embedding};
use crate::generation::Generator;
use crate::ingestion::pdf::TextExtractor;
use crate::{DocQaError, Result};

/// Embeds text as lowercase ASCII letter counts (26 dimensions)
#[derive(Debug, Default)]
pub struct LetterEmbedder {
    calls: AtomicUsize,
}

impl LetterEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn letter_counts(text: &str) -> Embedding {
    let mut vector = vec![0.0; 26];
    for c in text.chars().filter(char::is_ascii_alphabetic) {
        vector[usize::from(c.to_ascii_lowercase() as u8 - b'a')] += 1.0;
    }
    vector
}

impl Embedder for LetterEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| letter_counts(t)).collect())
    }

    fn model_name(&self) -> &str {
        "letters"
    }
}

/// Returns the same vector for every input
#[derive(Debug, Default)]
pub struct FixedEmbedder(pub Embedding);

impl Embedder for FixedEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|_| self.0.clone()).collect())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Reads `.pdf` files as UTF-8; a file containing `%CORRUPT%` fails extraction
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)?;
        if text.contains("%CORRUPT%") {
            return Err(DocQaError::Extraction {
                path: path.to_path_buf(),
                message: "unreadable document".to_string(),
            });
        }
        Ok(text)
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "pdf")
    }
}

/// Records every prompt and answers with a fixed string
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    pub answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl Generator for RecordingGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Always fails, as an unreachable model server would
#[derive(Debug, Default)]
pub struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> Result<String> {
        Err(DocQaError::Generation("model unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// A single-page PDF with a correct xref table
pub fn single_page_pdf(resources: &str, content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources {} /Contents 4 0 R >>",
            resources
        ),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (number, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", number + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    pdf
}

/// Page text drawn with a font the page resources never define
pub fn pdf_with_missing_font() -> Vec<u8> {
    single_page_pdf("<< >>", "BT /F1 12 Tf 72 720 Td (Hello) Tj ET")
}

/// Page text drawn with the standard Helvetica font
pub fn pdf_with_text(text: &str) -> Vec<u8> {
    single_page_pdf(
        "<< /Font << /F1 << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> >> >>",
        &format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text),
    )
}
