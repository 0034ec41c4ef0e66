//! Reimbursement statement extraction.

mod coercer;
mod matcher;
mod normalizer;
mod pipeline;
pub mod rules;

pub use coercer::coerce;
pub use matcher::{Marker, RecordGrammar, RecordMatcher};
pub use normalizer::normalize;
pub use pipeline::{CoercionFailure, Extraction, ExtractionPipeline, Outcome};

/// Trait for statement parsers.
pub trait StatementParser {
    /// Parse every care record out of decoded statement text.
    fn parse(&self, text: &str) -> Extraction;
}
