//! Field-level rules for reimbursement statements.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{format_amount, parse_amount};
pub use dates::parse_care_date;
pub use patterns::*;
