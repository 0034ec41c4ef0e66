//! Extraction pipeline: normalize, match, coerce.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CoercionError, ExtractionError};
use crate::models::care::{CareRecord, GrammarVariant};
use crate::source::{FormatHint, SourceDecoder};

use super::coercer::coerce;
use super::matcher::{Marker, RecordGrammar, RecordMatcher};
use super::normalizer::normalize;
use super::StatementParser;

/// A matched record that could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionFailure {
    /// Zero-based index of the match in the document.
    pub index: usize,
    /// Why it was dropped.
    #[serde(serialize_with = "serialize_display")]
    pub error: CoercionError,
}

fn serialize_display<S: serde::Serializer>(
    error: &CoercionError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Coarse classification of an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The document holds no occurrence of the record grammar.
    NoMatches,
    /// Every match became a record.
    Complete,
    /// Some matches were dropped.
    Partial,
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Coerced records, in document order.
    pub records: Vec<CareRecord>,
    /// Matches dropped during coercion.
    pub failures: Vec<CoercionFailure>,
    /// Number of grammar occurrences found.
    pub matched: usize,
    /// Variant of the first occurrence.
    pub variant: Option<GrammarVariant>,
}

impl Extraction {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// No records were produced.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn outcome(&self) -> Outcome {
        if self.matched == 0 {
            Outcome::NoMatches
        } else if self.failures.is_empty() {
            Outcome::Complete
        } else {
            Outcome::Partial
        }
    }
}

/// Composes normalizer, matcher and coercer.
///
/// The pipeline holds no per-call state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPipeline {
    matcher: RecordMatcher,
    decoder: SourceDecoder,
}

impl ExtractionPipeline {
    /// Create a pipeline accepting plain and any-marker documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the accepted delimiter.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.matcher = RecordMatcher::new(RecordGrammar::new(marker));
        self
    }

    /// Use a custom decoder for byte input.
    pub fn with_decoder(mut self, decoder: SourceDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn marker(&self) -> Marker {
        self.matcher.grammar().marker()
    }

    /// Extract every care record from already-decoded text.
    pub fn extract(&self, raw_text: &str) -> Extraction {
        let start = Instant::now();
        let text = normalize(raw_text);

        let mut records = Vec::new();
        let mut failures = Vec::new();
        let mut variant = None;
        let mut matched = 0;

        for raw in self.matcher.matches(&text) {
            matched += 1;
            variant.get_or_insert(raw.variant);

            match coerce(&raw) {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!("Dropping record {}: {}", raw.index, error);
                    failures.push(CoercionFailure {
                        index: raw.index,
                        error,
                    });
                }
            }
        }

        if matched == 0 {
            info!("No reimbursement records found in {} characters of text", raw_text.len());
        } else {
            debug!(
                "Extracted {} of {} records ({} failed) in {:?}",
                records.len(),
                matched,
                failures.len(),
                start.elapsed()
            );
        }

        Extraction {
            records,
            failures,
            matched,
            variant,
        }
    }

    /// Decode `bytes` and extract from the resulting text.
    ///
    /// Only a decoding failure is an error; an empty result is not.
    pub fn extract_bytes(&self, bytes: &[u8], hint: FormatHint) -> Result<Extraction, ExtractionError> {
        let text = self.decoder.decode(bytes, hint)?;
        Ok(self.extract(&text))
    }
}

impl StatementParser for ExtractionPipeline {
    fn parse(&self, text: &str) -> Extraction {
        self.extract(text)
    }
}
