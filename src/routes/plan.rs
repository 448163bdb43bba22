use actix_web::{web, HttpResponse, Responder};

use crate::models::travel_plan::TripRequest;
use crate::routes::error_response;
use crate::services::trip_session::TripSession;

/*
    /api/plans
*/
pub async fn create(
    session: web::Data<TripSession>,
    input: web::Json<TripRequest>,
) -> impl Responder {
    let request = input.into_inner();
    log::info!("Plan requested: {} days in {}", request.days, request.country);

    match session.search(&request.country, request.days).await {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(err) => {
            log::warn!("Plan request failed: {}", err);
            error_response(&err)
        }
    }
}
