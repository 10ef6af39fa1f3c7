use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::db::industries;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeChanges, EmployeeFacts, EmployeeRecord};

const EMPLOYEE_SELECT: &str = r#"
    SELECT
        e.employee_id,
        e.first_name,
        e.last_name,
        e.email,
        e.gender,
        e.date_of_birth,
        i.name AS industry,
        e.salary::FLOAT8 AS salary,
        e.years_of_experience,
        e.created_at,
        e.updated_at
    FROM employees e
    LEFT JOIN industries i ON i.industry_id = e.industry_id
"#;

pub async fn list<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Employee>, AppError> {
    let sql = format!("{} ORDER BY e.last_name, e.first_name", EMPLOYEE_SELECT);
    let employees = sqlx::query_as::<_, Employee>(&sql).fetch_all(executor).await?;
    Ok(employees)
}

pub async fn find<'e, E: PgExecutor<'e>>(executor: E, employee_id: Uuid) -> Result<Employee, AppError> {
    let sql = format!("{} WHERE e.employee_id = $1", EMPLOYEE_SELECT);
    sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
}

async fn resolve_industry(conn: &mut PgConnection, name: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match name {
        Some(name) => Ok(Some(industries::get_or_create(&mut *conn, name).await?)),
        None => Ok(None),
    }
}

/// Inserts an employee, creating its industry on first reference. A duplicate email
/// comes back as `AppError::Conflict` from the unique constraint.
pub async fn insert(conn: &mut PgConnection, record: &EmployeeRecord) -> Result<Uuid, AppError> {
    let industry_id = resolve_industry(conn, record.industry.as_deref()).await?;
    let employee_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO employees (
            employee_id, first_name, last_name, email, gender, date_of_birth,
            industry_id, salary, years_of_experience
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8::FLOAT8::NUMERIC(10, 2), $9)
        "#,
    )
    .bind(employee_id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.email)
    .bind(record.gender.map(|g| g.as_str()))
    .bind(record.date_of_birth)
    .bind(industry_id)
    .bind(record.salary)
    .bind(record.years_of_experience)
    .execute(&mut *conn)
    .await?;

    Ok(employee_id)
}

/// Overwrites every writable field.
pub async fn replace(conn: &mut PgConnection, employee_id: Uuid, record: &EmployeeRecord) -> Result<(), AppError> {
    let industry_id = resolve_industry(conn, record.industry.as_deref()).await?;

    let result = sqlx::query(
        r#"
        UPDATE employees SET
            first_name = $2,
            last_name = $3,
            email = $4,
            gender = $5,
            date_of_birth = $6,
            industry_id = $7,
            salary = $8::FLOAT8::NUMERIC(10, 2),
            years_of_experience = $9,
            updated_at = NOW()
        WHERE employee_id = $1
        "#,
    )
    .bind(employee_id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.email)
    .bind(record.gender.map(|g| g.as_str()))
    .bind(record.date_of_birth)
    .bind(industry_id)
    .bind(record.salary)
    .bind(record.years_of_experience)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }
    Ok(())
}

/// Updates only the fields set in `changes`. Nullable columns take a set flag next to
/// their value so an explicit null clears them.
pub async fn apply_changes(
    conn: &mut PgConnection,
    employee_id: Uuid,
    changes: &EmployeeChanges,
) -> Result<(), AppError> {
    let industry_id = match &changes.industry {
        Some(name) => resolve_industry(conn, name.as_deref()).await?,
        None => None,
    };

    let result = sqlx::query(
        r#"
        UPDATE employees SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            gender = CASE WHEN $5 THEN $6 ELSE gender END,
            date_of_birth = COALESCE($7, date_of_birth),
            industry_id = CASE WHEN $8 THEN $9 ELSE industry_id END,
            salary = CASE WHEN $10 THEN $11::FLOAT8::NUMERIC(10, 2) ELSE salary END,
            years_of_experience = CASE WHEN $12 THEN $13 ELSE years_of_experience END,
            updated_at = NOW()
        WHERE employee_id = $1
        "#,
    )
    .bind(employee_id)
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.gender.is_some())
    .bind(changes.gender.flatten().map(|g| g.as_str()))
    .bind(changes.date_of_birth)
    .bind(changes.industry.is_some())
    .bind(industry_id)
    .bind(changes.salary.is_some())
    .bind(changes.salary.flatten())
    .bind(changes.years_of_experience.is_some())
    .bind(changes.years_of_experience.flatten())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }
    Ok(())
}

pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, employee_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM employees WHERE employee_id = $1")
        .bind(employee_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }
    Ok(())
}

/// Loads every employee, reduced to the columns the reports need.
pub async fn load_facts<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<EmployeeFacts>, AppError> {
    let facts = sqlx::query_as::<_, EmployeeFacts>(
        r#"
        SELECT
            i.name AS industry,
            e.gender,
            e.date_of_birth,
            e.salary::FLOAT8 AS salary,
            e.years_of_experience
        FROM employees e
        LEFT JOIN industries i ON i.industry_id = e.industry_id
        "#,
    )
    .fetch_all(executor)
    .await?;
    Ok(facts)
}
