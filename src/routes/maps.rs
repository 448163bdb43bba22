use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::routes::error_response;
use crate::services::trip_session::TripSession;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialInput {
    api_key: String,
}

/*
    /api/map
*/
pub async fn get_scene(session: web::Data<TripSession>) -> impl Responder {
    match session.map_scene().await {
        Some(scene) => HttpResponse::Ok().json(scene),
        None => HttpResponse::NotFound().json(json!({ "error": "No travel plan yet" })),
    }
}

/*
    /api/maps/credential
*/
pub async fn save_credential(
    session: web::Data<TripSession>,
    input: web::Json<CredentialInput>,
) -> impl Responder {
    match session.save_credential(&input.api_key).await {
        Ok(()) => {
            let status = session.map_status().await;
            HttpResponse::Ok().json(json!({ "status": status }))
        }
        Err(err) => error_response(&err),
    }
}

/*
    /api/maps/runtime
*/
pub async fn get_runtime(session: web::Data<TripSession>) -> impl Responder {
    match session.map_runtime().await {
        Some(runtime) => HttpResponse::Ok().json(runtime),
        None => HttpResponse::NotFound().json(json!({ "error": "Map runtime not loaded" })),
    }
}
