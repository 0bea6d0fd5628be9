use super::*;
use crate::testing::{pdf_with_missing_font, pdf_with_text};
use tempfile::TempDir;

#[test]
fn pdf_extension_is_case_insensitive() {
    let extractor = PdfExtractor;
    assert!(extractor.can_extract(Path::new("report.pdf")));
    assert!(extractor.can_extract(Path::new("REPORT.PDF")));
    assert!(!extractor.can_extract(Path::new("notes.txt")));
    assert!(!extractor.can_extract(Path::new("pdf")));
}

#[test]
fn discover_only_returns_pdfs_in_sorted_order() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    for name in ["b.pdf", "a.pdf", "notes.txt", "C.PDF"] {
        fs::write(temp_dir.path().join(name), b"placeholder").expect("should write file");
    }
    fs::create_dir(temp_dir.path().join("nested.pdf")).expect("should create dir");

    let documents =
        discover_documents(temp_dir.path(), &PdfExtractor).expect("discovery should succeed");
    let names: Vec<_> = documents
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();

    assert_eq!(names, vec!["C.PDF", "a.pdf", "b.pdf"]);
}

#[test]
fn missing_directory_has_no_documents() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let documents = discover_documents(&temp_dir.path().join("missing"), &PdfExtractor)
        .expect("discovery should succeed");
    assert!(documents.is_empty());
}

#[test]
fn invalid_pdf_is_an_extraction_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("broken.pdf");
    fs::write(&path, b"this is not a pdf").expect("should write file");

    let result = PdfExtractor.extract_text(&path);
    match result {
        Err(DocQaError::Extraction { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected extraction error, got {:?}", other),
    }
}

#[test]
fn undefined_font_is_an_extraction_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("missing_font.pdf");
    fs::write(&path, pdf_with_missing_font()).expect("should write file");

    let result = PdfExtractor.extract_text(&path);
    match result {
        Err(DocQaError::Extraction { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected extraction error, got {:?}", other),
    }
}

#[test]
fn standard_font_text_is_extracted() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("hello.pdf");
    fs::write(&path, pdf_with_text("Hello world")).expect("should write file");

    let text = PdfExtractor.extract_text(&path).expect("extraction should succeed");
    assert!(text.contains("Hello"), "unexpected text: {:?}", text);
}
