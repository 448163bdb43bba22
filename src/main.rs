use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travel_planner_api::config::AppConfig;
use travel_planner_api::routes;
use travel_planner_api::services::completion::GeminiClient;
use travel_planner_api::services::credential_store::FileCredentialStore;
use travel_planner_api::services::maps_loader::GoogleMapsLoader;
use travel_planner_api::services::trip_session::TripSession;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let completion = GeminiClient::from_config(&config).map_err(io::Error::other)?;
    let loader = GoogleMapsLoader::from_config(&config).map_err(io::Error::other)?;
    let credentials = FileCredentialStore::new(&config.credential_store_path);
    log::info!(
        "Using model {} with credential store at {}",
        config.gemini_model,
        config.credential_store_path.display()
    );

    let session = web::Data::new(TripSession::new(
        Arc::new(completion),
        Arc::new(loader),
        Arc::new(credentials),
    ));
    session.start().await;

    log::info!("Binding to {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(session.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
