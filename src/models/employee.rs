use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stats::aggregate::round_to;

// Column limits from the employees/industries tables.
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const SALARY_MAX: f64 = 99_999_999.99;

/// Rounds a salary to cents the way the NUMERIC(10, 2) column will, returning `None`
/// if the stored value would be negative, non-finite or overflow the column.
pub fn storable_salary(salary: f64) -> Option<f64> {
    if !salary.is_finite() {
        return None;
    }
    let cents = round_to(salary, 2);
    (0.0..=SALARY_MAX).contains(&cents).then_some(cents)
}

/// An employee as returned by the API, with the industry name resolved.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Employee {
    pub employee_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Option<String>,
    pub date_of_birth: NaiveDate,
    pub industry: Option<String>,
    pub salary: Option<f64>,
    pub years_of_experience: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable fields of an employee. `industry` is a name, resolved (or created) on write.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub date_of_birth: NaiveDate,
    pub industry: Option<String>,
    pub salary: Option<f64>,
    pub years_of_experience: Option<i32>,
}

/// Partial update; `None` leaves the stored value untouched. For nullable columns
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Option<Gender>>,
    pub date_of_birth: Option<NaiveDate>,
    pub industry: Option<Option<String>>,
    pub salary: Option<Option<f64>>,
    pub years_of_experience: Option<Option<i32>>,
}

/// Just the columns the reports aggregate over.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct EmployeeFacts {
    pub industry: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: NaiveDate,
    pub salary: Option<f64>,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Accepts `male`/`female` and the one-letter forms, ignoring case and surrounding space.
    pub fn parse(raw: &str) -> Option<Gender> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parsing_is_lenient() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse(" f "), Some(Gender::Female));
        assert_eq!(Gender::parse("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::parse("Non-binary"), None);
        assert_eq!(Gender::parse(""), None);
    }

    #[test]
    fn gender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(Gender::Male.as_str(), "male");
    }

    #[test]
    fn salary_is_checked_after_rounding_to_cents() {
        assert_eq!(storable_salary(55000.004), Some(55000.0));
        assert_eq!(storable_salary(99_999_999.99), Some(99_999_999.99));
        assert_eq!(storable_salary(99_999_999.999), None);
        assert_eq!(storable_salary(1e12), None);
        assert_eq!(storable_salary(-0.5), None);
        assert_eq!(storable_salary(f64::INFINITY), None);
    }
}
