use actix_web::{web, HttpResponse, Responder};

use crate::services::trip_session::TripSession;

/*
    /api/session
*/
pub async fn get_session(session: web::Data<TripSession>) -> impl Responder {
    HttpResponse::Ok().json(session.snapshot().await)
}
