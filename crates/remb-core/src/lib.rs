//! Core library for healthcare reimbursement statements.
//!
//! This crate provides:
//! - Document decoding (UTF-8 text and PDF text layers)
//! - The extraction pipeline: whitespace normalization, record matching
//!   for plain and marked statement variants, and field coercion
//! - Monthly aggregation of extracted records
//! - An explicit record store for callers that persist results

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod source;
pub mod statement;
pub mod store;
pub mod summary;

pub use error::{CoercionError, ExtractionError, RembError, Result, SummaryError};
pub use models::care::{AmountField, CareRecord, GrammarVariant, RawRecordMatch, StoredRecord};
pub use models::config::RembConfig;
pub use source::{FormatHint, SourceDecoder};
pub use statement::{Extraction, ExtractionPipeline, Marker, Outcome, StatementParser};
pub use store::{JsonLinesStore, RecordStore};
pub use summary::{monthly_totals, Month, MonthlyTotal};
