use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::services::map_bootstrap::MapStatus;
use crate::services::trip_session::TripSession;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    version: String,
    maps: MapStatus,
}

pub async fn health_check(session: web::Data<TripSession>) -> impl Responder {
    let maps = session.map_status().await;
    let status = match maps {
        MapStatus::Ready => "ok",
        _ => "degraded",
    };

    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        maps,
    })
}
