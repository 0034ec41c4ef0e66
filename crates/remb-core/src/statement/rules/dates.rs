//! Care date coercion.

use chrono::NaiveDate;

use super::patterns::DATE_DMY;
use crate::error::CoercionError;

/// Parse a `dd/mm/yyyy` date, ignoring any whitespace inside it.
pub fn parse_care_date(raw: &str) -> Result<NaiveDate, CoercionError> {
    let invalid = || CoercionError::InvalidDate {
        value: raw.to_string(),
    };

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = DATE_DMY.captures(&compact).ok_or_else(invalid)?;

    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let year: i32 = caps[3].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}
