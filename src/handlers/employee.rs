use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::errors::AppError;
use crate::models::employee::{storable_salary, EmployeeChanges, EmployeeRecord, Gender, SALARY_MAX};
use crate::utils::validation::{double_option, non_blank, parse_id, validate_gender, validate_payload};

#[derive(Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 100))]
    first_name: String,
    #[validate(length(min = 1, max = 100))]
    last_name: String,
    #[validate(email, length(max = 254))]
    email: String,
    #[validate(custom = "validate_gender")]
    gender: Option<String>,
    date_of_birth: NaiveDate,
    #[validate(length(max = 100))]
    industry: Option<String>,
    #[validate(range(min = 0.0))]
    salary: Option<f64>,
    #[validate(range(min = 0))]
    years_of_experience: Option<i32>,
}

/// Absent fields are left alone; `null` clears gender, industry, salary or years of experience.
#[derive(Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EmployeeUpdate {
    #[validate(length(min = 1, max = 100))]
    first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    last_name: Option<String>,
    #[validate(email, length(max = 254))]
    email: Option<String>,
    #[validate(custom = "validate_gender")]
    #[serde(default, deserialize_with = "double_option")]
    gender: Option<Option<String>>,
    date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "double_option")]
    industry: Option<Option<String>>,
    #[validate(range(min = 0.0))]
    #[serde(default, deserialize_with = "double_option")]
    salary: Option<Option<f64>>,
    #[validate(range(min = 0))]
    #[serde(default, deserialize_with = "double_option")]
    years_of_experience: Option<Option<i32>>,
}

/// The column is NUMERIC(10, 2), so the limit applies to the value rounded to cents.
fn checked_salary(salary: Option<f64>) -> Result<Option<f64>, AppError> {
    match salary {
        Some(salary) => storable_salary(salary).map(Some).ok_or_else(|| {
            AppError::BadRequest(format!("salary must be between 0 and {:.2}", SALARY_MAX))
        }),
        None => Ok(None),
    }
}

impl TryFrom<&NewEmployee> for EmployeeRecord {
    type Error = AppError;

    fn try_from(payload: &NewEmployee) -> Result<Self, AppError> {
        Ok(EmployeeRecord {
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            email: payload.email.clone(),
            gender: payload.gender.as_deref().and_then(Gender::parse),
            date_of_birth: payload.date_of_birth,
            industry: non_blank(payload.industry.as_deref()),
            salary: checked_salary(payload.salary)?,
            years_of_experience: payload.years_of_experience,
        })
    }
}

impl TryFrom<&EmployeeUpdate> for EmployeeChanges {
    type Error = AppError;

    fn try_from(payload: &EmployeeUpdate) -> Result<Self, AppError> {
        let salary = match payload.salary {
            Some(salary) => Some(checked_salary(salary)?),
            None => None,
        };
        Ok(EmployeeChanges {
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            email: payload.email.clone(),
            gender: payload
                .gender
                .as_ref()
                .map(|gender| gender.as_deref().and_then(Gender::parse)),
            date_of_birth: payload.date_of_birth,
            industry: payload.industry.as_ref().map(|industry| non_blank(industry.as_deref())),
            salary,
            years_of_experience: payload.years_of_experience,
        })
    }
}

pub async fn get_employees(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let employees = db::employees::list(&**pool).await?;
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn create_employee(
    pool: web::Data<PgPool>,
    new_employee: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*new_employee)?;
    let record = EmployeeRecord::try_from(&*new_employee)?;

    let mut tx = pool.begin().await?;
    let employee_id = db::employees::insert(&mut tx, &record).await.map_err(|err| {
        if err.is_conflict() {
            AppError::Conflict("Email already exists".to_string())
        } else {
            err
        }
    })?;
    let employee = db::employees::find(&mut *tx, employee_id).await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(employee))
}

pub async fn get_employee(pool: web::Data<PgPool>, employee_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id, "employee")?;
    let employee = db::employees::find(&**pool, employee_id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn replace_employee(
    pool: web::Data<PgPool>,
    employee_id: web::Path<String>,
    replacement: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id, "employee")?;
    validate_payload(&*replacement)?;
    let record = EmployeeRecord::try_from(&*replacement)?;

    let mut tx = pool.begin().await?;
    db::employees::replace(&mut tx, employee_id, &record).await?;
    let employee = db::employees::find(&mut *tx, employee_id).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(employee))
}

pub async fn update_employee(
    pool: web::Data<PgPool>,
    employee_id: web::Path<String>,
    updates: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id, "employee")?;
    validate_payload(&*updates)?;
    let changes = EmployeeChanges::try_from(&*updates)?;

    let mut tx = pool.begin().await?;
    db::employees::apply_changes(&mut tx, employee_id, &changes).await?;
    let employee = db::employees::find(&mut *tx, employee_id).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(employee))
}

pub async fn delete_employee(
    pool: web::Data<PgPool>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id, "employee")?;
    db::employees::delete(&**pool, employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> NewEmployee {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn new_employee_maps_to_record() {
        let new_employee = payload(json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane.doe@example.com",
            "gender": "female",
            "date_of_birth": "1985-01-01",
            "industry": "  Retail ",
            "salary": 60000.0,
            "years_of_experience": 8
        }));
        assert!(new_employee.validate().is_ok());

        let record = EmployeeRecord::try_from(&new_employee).unwrap();
        assert_eq!(record.gender, Some(Gender::Female));
        assert_eq!(record.industry.as_deref(), Some("Retail"));
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1985, 1, 1).unwrap());
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let new_employee = payload(json!({
            "first_name": "Bob",
            "last_name": "Smith",
            "email": "bob@example.com",
            "date_of_birth": "1980-01-01"
        }));
        assert!(new_employee.validate().is_ok());

        let record = EmployeeRecord::try_from(&new_employee).unwrap();
        assert_eq!(record.gender, None);
        assert_eq!(record.industry, None);
        assert_eq!(record.salary, None);
    }

    #[test]
    fn rejects_bad_email_gender_and_negative_numbers() {
        let new_employee = payload(json!({
            "first_name": "Bob",
            "last_name": "Smith",
            "email": "not-an-email",
            "gender": "robot",
            "date_of_birth": "1980-01-01",
            "salary": -1.0,
            "years_of_experience": -3
        }));
        let errors = new_employee.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("gender"));
        assert!(fields.contains_key("salary"));
        assert!(fields.contains_key("years_of_experience"));
    }

    #[test]
    fn update_only_carries_present_fields() {
        let update: EmployeeUpdate = serde_json::from_value(json!({ "salary": 72000.5 })).unwrap();
        assert!(update.validate().is_ok());
        let changes = EmployeeChanges::try_from(&update).unwrap();
        assert_eq!(
            changes,
            EmployeeChanges {
                salary: Some(Some(72000.5)),
                ..EmployeeChanges::default()
            }
        );
    }

    #[test]
    fn explicit_null_clears_nullable_fields() {
        let update: EmployeeUpdate = serde_json::from_value(json!({
            "gender": null,
            "industry": null,
            "salary": null,
            "years_of_experience": null
        }))
        .unwrap();
        assert!(update.validate().is_ok());
        let changes = EmployeeChanges::try_from(&update).unwrap();
        assert_eq!(
            changes,
            EmployeeChanges {
                gender: Some(None),
                industry: Some(None),
                salary: Some(None),
                years_of_experience: Some(None),
                ..EmployeeChanges::default()
            }
        );
    }

    #[test]
    fn update_values_are_checked_and_normalised() {
        let update: EmployeeUpdate = serde_json::from_value(json!({
            "gender": "male",
            "industry": "   "
        }))
        .unwrap();
        assert!(update.validate().is_ok());
        let changes = EmployeeChanges::try_from(&update).unwrap();
        assert_eq!(changes.gender, Some(Some(Gender::Male)));
        assert_eq!(changes.industry, Some(None));

        let bad: EmployeeUpdate = serde_json::from_value(json!({ "gender": "robot", "salary": -5.0 })).unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("gender"));
        assert!(errors.field_errors().contains_key("salary"));
    }

    #[test]
    fn salary_that_rounds_past_the_column_limit_is_bad_request() {
        let new_employee = payload(json!({
            "first_name": "Rich",
            "last_name": "Person",
            "email": "rich@example.com",
            "date_of_birth": "1970-01-01",
            "salary": 99999999.999
        }));
        assert!(new_employee.validate().is_ok());
        let err = EmployeeRecord::try_from(&new_employee).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let update: EmployeeUpdate = serde_json::from_value(json!({ "salary": 99999999.999 })).unwrap();
        assert!(update.validate().is_ok());
        assert!(matches!(EmployeeChanges::try_from(&update), Err(AppError::BadRequest(_))));

        let at_limit: EmployeeUpdate = serde_json::from_value(json!({ "salary": 99999999.994 })).unwrap();
        let changes = EmployeeChanges::try_from(&at_limit).unwrap();
        assert_eq!(changes.salary, Some(Some(99_999_999.99)));
    }
}
