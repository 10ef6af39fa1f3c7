pub mod employee;
pub mod industry;
pub mod stats;

use actix_web::web;

use crate::errors::AppError;

/// Registers every route. Paths are written without a trailing slash; the app wraps
/// them in `NormalizePath::trim()` so `/employees/` works too.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/employees")
            .route(web::get().to(employee::get_employees))
            .route(web::post().to(employee::create_employee)),
    )
    .service(
        web::resource("/employees/{employee_id}")
            .route(web::get().to(employee::get_employee))
            .route(web::put().to(employee::replace_employee))
            .route(web::patch().to(employee::update_employee))
            .route(web::delete().to(employee::delete_employee)),
    )
    .service(
        web::resource("/industries")
            .route(web::get().to(industry::get_industries))
            .route(web::post().to(industry::create_industry)),
    )
    .service(
        web::resource("/industries/{industry_id}")
            .route(web::get().to(industry::get_industry))
            .route(web::delete().to(industry::delete_industry)),
    )
    .service(web::resource("/averages_per_industry").route(web::get().to(stats::averages_per_industry)))
    .service(web::resource("/averages_per_yoe").route(web::get().to(stats::averages_per_experience)))
    .service(web::resource("/agestats").route(web::get().to(stats::salary_by_experience_and_age)))
    .service(web::resource("/genderstats").route(web::get().to(stats::salary_by_gender_and_experience)));
}

/// Malformed JSON bodies answer with the same `{"error": ...}` shape as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{middleware, test, App};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;

    // Never connects; these requests are all rejected before touching the database.
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://hr:hr@localhost:5432/hr_unused")
            .unwrap()
    }

    #[actix_web::test]
    async fn malformed_employee_id_is_bad_request_with_trailing_slash() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(json_config())
                .wrap(middleware::NormalizePath::trim())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/employees/not-a-uuid/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid employee ID");
    }

    #[actix_web::test]
    async fn invalid_employee_payload_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(json_config())
                .wrap(middleware::NormalizePath::trim())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/employees/")
            .set_json(json!({
                "first_name": "John",
                "last_name": "Doe",
                "email": "nope",
                "date_of_birth": "1990-01-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("email"));
    }

    #[actix_web::test]
    async fn unparseable_json_uses_error_shape() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(json_config())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/industries")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\":")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body.get("error").is_some());
    }
}
