//! Common regex patterns for reimbursement statements.

use lazy_static::lazy_static;
use regex::Regex;

/// A delimiter that may wrap dates and rates in marked documents: any single
/// character that is not a letter, digit, whitespace or parenthesis.
pub const ANY_MARKER: &str = r"[^\p{L}\p{N}\s()]";

/// dd/mm/yyyy with incidental whitespace around the slashes.
pub const DATE_FIELD: &str = r"\d{2}\s*/\s*\d{2}\s*/\s*\d{4}";

/// Uppercase care label (letters, spaces, periods).
pub const LABEL_FIELD: &str = r"[\p{Lu}\s.]+?";

/// Care code between parentheses.
pub const CODE_FIELD: &str = r"[^)]+";

/// Comma-decimal amount such as `50,00`.
pub const AMOUNT_FIELD: &str = r"\d+,\d+";

/// Percentage such as `70%`.
pub const RATE_FIELD: &str = r"\d+%";

lazy_static! {
    // Any run of whitespace, including line breaks and NBSP
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Compacted date: 15/03/2024
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{2})/(\d{2})/(\d{4})$"
    ).unwrap();

    // Amount with an optional comma decimal part: 50,00 or 70
    pub static ref AMOUNT_TEXT: Regex = Regex::new(
        r"^\d+(?:,\d+)?$"
    ).unwrap();
}
