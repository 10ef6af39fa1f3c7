use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::errors::AppError;
use crate::utils::validation::{parse_id, validate_payload};

#[derive(Deserialize, Validate)]
pub struct NewIndustry {
    #[validate(length(min = 1, max = 100))]
    name: String,
}

pub async fn get_industries(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let industries = db::industries::list(&**pool).await?;
    Ok(HttpResponse::Ok().json(industries))
}

pub async fn create_industry(
    pool: web::Data<PgPool>,
    new_industry: web::Json<NewIndustry>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*new_industry)?;

    let industry = db::industries::create(&**pool, new_industry.name.trim())
        .await
        .map_err(|err| {
            if err.is_conflict() {
                AppError::Conflict("Industry name already exists".to_string())
            } else {
                err
            }
        })?;

    Ok(HttpResponse::Created().json(industry))
}

pub async fn get_industry(pool: web::Data<PgPool>, industry_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let industry_id = parse_id(&industry_id, "industry")?;
    let industry = db::industries::find(&**pool, industry_id).await?;
    Ok(HttpResponse::Ok().json(industry))
}

pub async fn delete_industry(
    pool: web::Data<PgPool>,
    industry_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let industry_id = parse_id(&industry_id, "industry")?;
    db::industries::delete(&**pool, industry_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Industry deleted successfully",
    })))
}
