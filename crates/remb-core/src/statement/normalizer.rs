//! Whitespace normalization for extracted statement text.

use std::borrow::Cow;

use super::rules::WHITESPACE_RUN;

/// Collapse every run of whitespace (line breaks included) into one ASCII space.
///
/// Records in PDF-extracted text routinely straddle line and page breaks;
/// after this pass the record grammar no longer depends on the original
/// line structure. Nothing else is touched.
pub fn normalize(text: &str) -> Cow<'_, str> {
    WHITESPACE_RUN.replace_all(text, " ")
}
