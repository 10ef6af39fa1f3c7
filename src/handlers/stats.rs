use actix_web::{web, HttpResponse};
use chrono::{Local, NaiveDate};
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::stats::reports;

// Ages are relative to the server's local date.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn averages_per_industry(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let employees = db::employees::load_facts(&**pool).await?;
    Ok(HttpResponse::Ok().json(reports::averages_per_industry(&employees, today())))
}

pub async fn averages_per_experience(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let employees = db::employees::load_facts(&**pool).await?;
    Ok(HttpResponse::Ok().json(reports::averages_per_experience(&employees)?))
}

pub async fn salary_by_experience_and_age(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let employees = db::employees::load_facts(&**pool).await?;
    Ok(HttpResponse::Ok().json(reports::salary_by_experience_and_age(&employees, today())?))
}

pub async fn salary_by_gender_and_experience(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let employees = db::employees::load_facts(&**pool).await?;
    Ok(HttpResponse::Ok().json(reports::salary_by_gender_and_experience(&employees)?))
}
