use actix_web::{web, HttpResponse, Responder};

use crate::models::destination_details::DestinationSelection;
use crate::routes::error_response;
use crate::services::trip_session::TripSession;

/*
    /api/destinations/select
*/
pub async fn select(
    session: web::Data<TripSession>,
    input: web::Json<DestinationSelection>,
) -> impl Responder {
    match session.select_destination(&input.name).await {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(err) => error_response(&err),
    }
}

/*
    /api/destinations/selection
*/
pub async fn close(session: web::Data<TripSession>) -> impl Responder {
    session.close_details().await;
    HttpResponse::NoContent().finish()
}
