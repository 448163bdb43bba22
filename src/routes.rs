use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::trip_session::SessionError;

pub mod destination;
pub mod health;
pub mod maps;
pub mod plan;
pub mod session;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route("/session", web::get().to(session::get_session))
                .route("/plans", web::post().to(plan::create))
                .service(
                    web::scope("/destinations")
                        .route("/select", web::post().to(destination::select))
                        .route("/selection", web::delete().to(destination::close)),
                )
                .route("/map", web::get().to(maps::get_scene))
                .service(
                    web::scope("/maps")
                        .route("/credential", web::put().to(maps::save_credential))
                        .route("/runtime", web::get().to(maps::get_runtime)),
                ),
        );
}

pub(crate) fn error_response(err: &SessionError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        SessionError::EmptyCountry
        | SessionError::InvalidDays
        | SessionError::BlankCredential
        | SessionError::NoPlan => HttpResponse::BadRequest().json(body),
        SessionError::UnknownDestination(_) => HttpResponse::NotFound().json(body),
        SessionError::MapsNotReady => HttpResponse::PreconditionFailed().json(body),
        SessionError::SearchInProgress => HttpResponse::Conflict().json(body),
        SessionError::PlanUnavailable | SessionError::MapUnavailable => {
            HttpResponse::BadGateway().json(body)
        }
        SessionError::CredentialStorage(_) => HttpResponse::InternalServerError().json(body),
    }
}
