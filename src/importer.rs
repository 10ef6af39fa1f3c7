//! Offline bulk import of employee records from a JSON array.
//!
//! Each record is normalised on its own: bad numbers become nulls, records that can't be
//! stored at all are reported and skipped, and an email that is already taken is skipped
//! without stopping the batch.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::employee::{storable_salary, EmployeeRecord, Gender, EMAIL_MAX_CHARS, NAME_MAX_CHARS};
use crate::utils::validation::non_blank;

const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

/// One entry of the import file. Everything is optional until normalised.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub industry: Option<String>,
    pub salary: Option<Value>,
    pub years_of_experience: Option<Value>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

/// Where imported employees are written. A taken email must come back as `AppError::Conflict`.
#[allow(async_fn_in_trait)]
pub trait EmployeeStore {
    async fn insert_employee(&mut self, record: &EmployeeRecord) -> Result<(), AppError>;
}

pub struct PgEmployeeStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgEmployeeStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        PgEmployeeStore { pool }
    }
}

impl EmployeeStore for PgEmployeeStore<'_> {
    async fn insert_employee(&mut self, record: &EmployeeRecord) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        db::employees::insert(&mut conn, record).await?;
        Ok(())
    }
}

pub fn read_records(path: &Path) -> Result<Vec<RawEmployee>, AppError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| AppError::BadRequest(format!("Cannot read {}: {}", path.display(), err)))?;
    serde_json::from_str(&contents)
        .map_err(|err| AppError::BadRequest(format!("Invalid import file {}: {}", path.display(), err)))
}

/// Imports the file at `path` into Postgres.
pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportSummary, AppError> {
    let records = read_records(path)?;
    info!("Importing {} records from {}", records.len(), path.display());
    import_records(&mut PgEmployeeStore::new(pool), records).await
}

/// Inserts every record it can. Only storage failures other than a duplicate email abort.
pub async fn import_records<S: EmployeeStore>(
    store: &mut S,
    records: Vec<RawEmployee>,
) -> Result<ImportSummary, AppError> {
    let total = records.len();
    let mut summary = ImportSummary::default();

    for (index, raw) in records.into_iter().enumerate() {
        let position = index + 1;
        let record = match normalize(raw) {
            Ok(record) => record,
            Err(reason) => {
                warn!("Skipping record {}/{}: {}", position, total, reason);
                summary.invalid += 1;
                continue;
            }
        };

        match store.insert_employee(&record).await {
            Ok(()) => {
                info!("Successfully added {} - {}/{}", record.first_name, position, total);
                summary.inserted += 1;
            }
            Err(err) if err.is_conflict() => {
                warn!(
                    "Couldn't add {}, email already taken: {} - {}/{}",
                    record.first_name, record.email, position, total
                );
                summary.duplicates += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "Import finished: {} inserted, {} duplicates skipped, {} invalid",
        summary.inserted, summary.duplicates, summary.invalid
    );
    Ok(summary)
}

/// Turns a raw entry into something storable, or explains why it can't be.
pub fn normalize(raw: RawEmployee) -> Result<EmployeeRecord, String> {
    let first_name = non_blank(raw.first_name.as_deref()).ok_or("missing first_name")?;
    let last_name = non_blank(raw.last_name.as_deref()).ok_or("missing last_name")?;
    let email = non_blank(raw.email.as_deref()).ok_or("missing email")?;
    let industry = non_blank(raw.industry.as_deref());

    check_length("first_name", &first_name, NAME_MAX_CHARS)?;
    check_length("last_name", &last_name, NAME_MAX_CHARS)?;
    check_length("email", &email, EMAIL_MAX_CHARS)?;
    if let Some(industry) = &industry {
        check_length("industry", industry, NAME_MAX_CHARS)?;
    }

    let date_of_birth = match non_blank(raw.date_of_birth.as_deref()) {
        Some(text) => parse_birth_date(&text).ok_or_else(|| format!("unparseable date_of_birth '{}'", text))?,
        None => return Err("missing date_of_birth".to_string()),
    };

    Ok(EmployeeRecord {
        first_name,
        last_name,
        email,
        gender: raw.gender.as_deref().and_then(Gender::parse),
        date_of_birth,
        industry,
        salary: non_negative_number(raw.salary.as_ref()).and_then(storable_salary),
        years_of_experience: non_negative_number(raw.years_of_experience.as_ref())
            .filter(|years| *years <= f64::from(i32::MAX))
            .map(|years| years.trunc() as i32),
    })
}

fn check_length(field: &str, value: &str, max_chars: usize) -> Result<(), String> {
    let chars = value.chars().count();
    if chars > max_chars {
        return Err(format!("{} is {} characters, limit is {}", field, chars, max_chars));
    }
    Ok(())
}

fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, BIRTH_DATE_FORMAT).ok()
}

/// JSON numbers and numeric strings; anything else, negative or not finite, is `None`.
fn non_negative_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number >= 0.0).then_some(number)
}
