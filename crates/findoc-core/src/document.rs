//! PDF text extraction tool available to document-reading agents.

use std::path::Path;

use crate::error::AnalyzerError;

/// Reads a PDF into page-marked text.
///
/// Pages are joined in order, each non-blank page prefixed with a 1-based
/// `[Page N]` marker. Blank pages are omitted; a document whose pages are
/// all blank is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentReader;

impl DocumentReader {
    pub fn read(&self, path: &Path) -> Result<String, AnalyzerError> {
        if !path.exists() {
            return Err(AnalyzerError::DocumentNotFound(path.to_path_buf()));
        }

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(AnalyzerError::InvalidDocument(
                "only PDF files are supported".to_string(),
            ));
        }

        let pages = pdf_extract::extract_text_by_pages(path).map_err(|err| {
            AnalyzerError::InvalidDocument(format!("text extraction failed: {err}"))
        })?;

        if pages.is_empty() {
            return Err(AnalyzerError::InvalidDocument(
                "the PDF appears to be empty or unreadable".to_string(),
            ));
        }

        let chunks: Vec<String> = pages
            .iter()
            .enumerate()
            .filter_map(|(idx, page)| {
                let trimmed = page.trim();
                (!trimmed.is_empty()).then(|| format!("[Page {}]\n{}", idx + 1, trimmed))
            })
            .collect();

        if chunks.is_empty() {
            return Err(AnalyzerError::InvalidDocument(
                "no extractable text was found in the PDF".to_string(),
            ));
        }

        Ok(chunks.join("\n\n"))
    }
}
