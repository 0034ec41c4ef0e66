//! Monthly aggregation of care records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SummaryError;
use crate::models::care::{AmountField, CareRecord};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Spending for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: Month,
    /// Sum of `paid_amount` over the month.
    pub paid_amount: Decimal,
    /// Sum of `reimbursed_amount` over the month.
    pub reimbursed_amount: Decimal,
    /// Number of records in the month.
    pub records: usize,
}

/// Sum paid and reimbursed amounts per month, oldest month first.
///
/// Fails instead of wrapping when a month's sum exceeds the decimal range.
pub fn monthly_totals<'a, I>(records: I) -> Result<Vec<MonthlyTotal>, SummaryError>
where
    I: IntoIterator<Item = &'a CareRecord>,
{
    let mut months: BTreeMap<Month, MonthlyTotal> = BTreeMap::new();

    for record in records {
        let month = Month {
            year: record.care_date.year(),
            month: record.care_date.month(),
        };
        let total = months.entry(month).or_insert_with(|| MonthlyTotal {
            month,
            paid_amount: Decimal::ZERO,
            reimbursed_amount: Decimal::ZERO,
            records: 0,
        });
        total.paid_amount = checked_sum(
            total.paid_amount,
            record.paid_amount,
            month,
            AmountField::PaidAmount,
        )?;
        total.reimbursed_amount = checked_sum(
            total.reimbursed_amount,
            record.reimbursed_amount,
            month,
            AmountField::ReimbursedAmount,
        )?;
        total.records += 1;
    }

    Ok(months.into_values().collect())
}

fn checked_sum(
    total: Decimal,
    amount: Decimal,
    month: Month,
    field: AmountField,
) -> Result<Decimal, SummaryError> {
    total
        .checked_add(amount)
        .ok_or(SummaryError::Overflow { month, field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(y: i32, m: u32, d: u32, paid: &str) -> CareRecord {
        CareRecord {
            care_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            care_type: "PHARMACIE".to_string(),
            care_code: "PH".to_string(),
            paid_amount: Decimal::from_str(paid).unwrap(),
            reimbursement_base: Decimal::ZERO,
            reimbursed_amount: Decimal::ONE,
            complementary_rate: "0%".to_string(),
            complementary_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn test_monthly_totals() {
        let records = vec![
            record(2024, 3, 15, "50.00"),
            record(2023, 12, 2, "10.00"),
            record(2024, 3, 1, "12.50"),
        ];

        let totals = monthly_totals(&records).unwrap();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].month.to_string(), "2023-12");
        assert_eq!(totals[0].paid_amount, Decimal::from_str("10.00").unwrap());
        assert_eq!(totals[1].month, Month { year: 2024, month: 3 });
        assert_eq!(totals[1].paid_amount, Decimal::from_str("62.50").unwrap());
        assert_eq!(totals[1].reimbursed_amount, Decimal::from(2));
        assert_eq!(totals[1].records, 2);
    }

    #[test]
    fn test_no_records() {
        assert!(monthly_totals(&Vec::<CareRecord>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_overflowing_month_is_an_error() {
        let huge = "9999999999999999999999999999";
        let records: Vec<_> = (1..=9).map(|d| record(2024, 5, d, huge)).collect();

        let err = monthly_totals(&records).unwrap_err();
        assert_eq!(
            err,
            SummaryError::Overflow {
                month: Month { year: 2024, month: 5 },
                field: AmountField::PaidAmount,
            }
        );
        assert_eq!(err.to_string(), "paid_amount total for 2024-05 overflows");

        assert!(monthly_totals(&records[..1]).is_ok());
    }
}
