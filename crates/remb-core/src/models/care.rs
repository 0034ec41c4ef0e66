//! Reimbursement line-item models.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reimbursed-care line item from a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareRecord {
    /// Date the care was given.
    pub care_date: NaiveDate,

    /// Care label, e.g. "CONSULTATION SPECIALISTE".
    pub care_type: String,

    /// Care code as printed between parentheses.
    pub care_code: String,

    /// Amount paid by the patient.
    pub paid_amount: Decimal,

    /// Reimbursement base.
    pub reimbursement_base: Decimal,

    /// Amount reimbursed by the primary scheme.
    pub reimbursed_amount: Decimal,

    /// Complementary rate, kept as printed (e.g. "70%").
    pub complementary_rate: String,

    /// Amount covered by the complementary insurer.
    pub complementary_amount: Decimal,
}

/// Grammar variant a record was matched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "marker")]
pub enum GrammarVariant {
    /// Fields separated by whitespace only.
    Plain,
    /// Date and percentages wrapped in the given delimiter.
    Marked(char),
}

impl fmt::Display for GrammarVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarVariant::Plain => f.write_str("plain"),
            GrammarVariant::Marked(c) => write!(f, "marked '{}'", c),
        }
    }
}

/// The eight text groups captured for one occurrence of the record grammar.
///
/// Fields are named after their position in the grammar, which is not the
/// display order of [`CareRecord`]: the sixth group feeds
/// `complementary_amount` and the seventh feeds `reimbursed_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecordMatch {
    /// Zero-based occurrence index within the document.
    pub index: usize,
    /// Byte span of the whole occurrence in the normalized text.
    pub span: (usize, usize),
    /// Variant detected for this occurrence.
    pub variant: GrammarVariant,

    pub date: String,
    pub care_type: String,
    pub care_code: String,
    pub paid_amount: String,
    pub reimbursement_base: String,
    pub complementary_amount: String,
    pub reimbursed_amount: String,
    pub complementary_rate: String,
}

impl RawRecordMatch {
    /// Captured groups in grammar order.
    pub fn groups(&self) -> [&str; 8] {
        [
            &self.date,
            &self.care_type,
            &self.care_code,
            &self.paid_amount,
            &self.reimbursement_base,
            &self.complementary_amount,
            &self.reimbursed_amount,
            &self.complementary_rate,
        ]
    }
}

/// Currency fields of a [`CareRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountField {
    PaidAmount,
    ReimbursementBase,
    ReimbursedAmount,
    ComplementaryAmount,
}

impl AmountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountField::PaidAmount => "paid_amount",
            AmountField::ReimbursementBase => "reimbursement_base",
            AmountField::ReimbursedAmount => "reimbursed_amount",
            AmountField::ComplementaryAmount => "complementary_amount",
        }
    }
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record persisted by a [`RecordStore`](crate::store::RecordStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Identifier assigned by the store.
    pub id: u64,

    #[serde(flatten)]
    pub record: CareRecord,
}
