//! Salary statistics: age computation, bracketing, grouped means and the report shapes
//! served by the API.

pub mod age;
pub mod aggregate;
pub mod brackets;
pub mod reports;
