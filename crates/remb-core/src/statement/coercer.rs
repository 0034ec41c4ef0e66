//! Coercion of raw matches into typed care records.

use crate::error::CoercionError;
use crate::models::care::{AmountField, CareRecord, RawRecordMatch};

use super::rules::{parse_amount, parse_care_date};

/// Turn one [`RawRecordMatch`] into a [`CareRecord`].
///
/// Groups are mapped by grammar position. The sixth group is printed as a
/// percentage-shaped figure in the source and feeds `complementary_amount`
/// once its `%` sign is dropped; the seventh feeds `reimbursed_amount`.
pub fn coerce(raw: &RawRecordMatch) -> Result<CareRecord, CoercionError> {
    let care_date = parse_care_date(&raw.date)?;

    let paid_amount = parse_amount(AmountField::PaidAmount, &raw.paid_amount)?;
    let reimbursement_base = parse_amount(AmountField::ReimbursementBase, &raw.reimbursement_base)?;
    let complementary_amount = parse_amount(
        AmountField::ComplementaryAmount,
        raw.complementary_amount.trim().trim_end_matches('%'),
    )
    .map_err(|_| CoercionError::InvalidAmount {
        field: AmountField::ComplementaryAmount,
        value: raw.complementary_amount.clone(),
    })?;
    let reimbursed_amount = parse_amount(AmountField::ReimbursedAmount, &raw.reimbursed_amount)?;

    Ok(CareRecord {
        care_date,
        care_type: raw.care_type.trim().to_string(),
        care_code: raw.care_code.clone(),
        paid_amount,
        reimbursement_base,
        reimbursed_amount,
        complementary_rate: raw.complementary_rate.clone(),
        complementary_amount,
    })
}
