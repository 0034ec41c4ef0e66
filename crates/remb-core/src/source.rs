//! Decoding uploaded documents into text.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtractionError, PdfError};
#[cfg(feature = "pdf")]
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

const PDF_MAGIC: &[u8] = b"%PDF-";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How the source bytes should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatHint {
    /// Sniff the bytes.
    #[default]
    Auto,
    /// UTF-8 text.
    Text,
    /// PDF document with a text layer.
    Pdf,
}

impl FormatHint {
    /// Guess from a file extension, falling back to [`FormatHint::Auto`].
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => FormatHint::Pdf,
            "txt" | "text" => FormatHint::Text,
            _ => FormatHint::Auto,
        }
    }
}

/// Turns raw document bytes into text for the pipeline.
#[derive(Debug, Clone)]
pub struct SourceDecoder {
    min_pdf_text_length: usize,
}

impl SourceDecoder {
    pub fn new() -> Self {
        Self {
            min_pdf_text_length: 20,
        }
    }

    /// Set the minimum visible text a PDF must carry to be considered readable.
    pub fn with_min_pdf_text_length(mut self, min: usize) -> Self {
        self.min_pdf_text_length = min;
        self
    }

    /// Decode `bytes` according to `hint`.
    pub fn decode(&self, bytes: &[u8], hint: FormatHint) -> Result<String, ExtractionError> {
        let hint = match hint {
            FormatHint::Auto if bytes.starts_with(PDF_MAGIC) => FormatHint::Pdf,
            FormatHint::Auto => FormatHint::Text,
            other => other,
        };
        debug!("Decoding {} bytes as {:?}", bytes.len(), hint);

        match hint {
            FormatHint::Pdf => Ok(self.decode_pdf(bytes)?),
            _ => decode_text(bytes),
        }
    }

    #[cfg(feature = "pdf")]
    fn decode_pdf(&self, bytes: &[u8]) -> Result<String, PdfError> {
        let mut extractor = PdfExtractor::new().with_min_text_length(self.min_pdf_text_length);
        extractor.load(bytes)?;

        let text = extractor.extract_text()?;
        if extractor.classify(&text) == PdfType::Empty {
            return Err(PdfError::TextExtraction(
                "document has no text layer".to_string(),
            ));
        }

        debug!(
            "Extracted {} chars from {} PDF pages",
            text.len(),
            extractor.page_count()
        );
        Ok(text)
    }

    #[cfg(not(feature = "pdf"))]
    fn decode_pdf(&self, _bytes: &[u8]) -> Result<String, PdfError> {
        Err(PdfError::Unsupported)
    }
}

impl Default for SourceDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}
