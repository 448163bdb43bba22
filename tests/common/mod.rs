use actix_web::{web, App};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use travel_planner_api::routes;
use travel_planner_api::services::completion::{
    CompletionClient, GenerationError, GenerationRequest,
};
use travel_planner_api::services::credential_store::MemoryCredentialStore;
use travel_planner_api::services::map_bootstrap::{MapLoadError, MapRuntime, RuntimeLoader};
use travel_planner_api::services::trip_session::TripSession;

pub const GOOD_KEY: &str = "maps-test-key";

/// Completion client that answers from a queue and records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, ()>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<Result<String, ()>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(())) => Err(GenerationError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }),
            None => Err(GenerationError::EmptyResponse),
        }
    }
}

/// Accepts only [`GOOD_KEY`].
#[derive(Default)]
pub struct FakeMapsLoader {
    pub loads: AtomicUsize,
}

#[async_trait]
impl RuntimeLoader for FakeMapsLoader {
    async fn is_present(&self) -> bool {
        false
    }

    async fn load(&self, credential: &str) -> Result<(), MapLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if credential == GOOD_KEY {
            Ok(())
        } else {
            Err(MapLoadError::Rejected("The provided API key is invalid.".to_string()))
        }
    }

    async fn discard_partial(&self) {}

    async fn runtime(&self) -> Option<MapRuntime> {
        Some(MapRuntime {
            script_url: format!("https://maps.test/maps/api/js?key={}&callback=initMap", GOOD_KEY),
        })
    }
}

pub struct TestApp {
    pub session: web::Data<TripSession>,
    pub completion: Arc<ScriptedCompletion>,
    pub loader: Arc<FakeMapsLoader>,
    pub credentials: Arc<MemoryCredentialStore>,
}

impl TestApp {
    pub async fn new(replies: Vec<Result<String, ()>>, stored_key: Option<&str>) -> Self {
        let completion = Arc::new(ScriptedCompletion::new(replies));
        let loader = Arc::new(FakeMapsLoader::default());
        let credentials = Arc::new(match stored_key {
            Some(key) => MemoryCredentialStore::with_credential(key),
            None => MemoryCredentialStore::default(),
        });

        let session = web::Data::new(TripSession::new(
            completion.clone(),
            loader.clone(),
            credentials.clone(),
        ));
        session.start().await;

        Self {
            session,
            completion,
            loader,
            credentials,
        }
    }

    pub async fn ready(replies: Vec<Result<String, ()>>) -> Self {
        Self::new(replies, Some(GOOD_KEY)).await
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.session.clone())
            .configure(routes::configure)
    }
}

pub fn plan_json(stops: &[(&str, i64)]) -> String {
    let destinations: Vec<_> = stops
        .iter()
        .enumerate()
        .map(|(i, (name, days))| {
            serde_json::json!({
                "name": name,
                "description": format!("All about {}", name),
                "location": { "lat": 40.0 + i as f64, "lng": 10.0 + i as f64 },
                "suggestedDays": days,
                "imageUrl": format!("https://upload.wikimedia.org/{}.jpg", name)
            })
        })
        .collect();

    serde_json::json!({
        "destinations": destinations,
        "boundingBox": { "north": 47.0, "south": 36.0, "east": 19.0, "west": 6.0 }
    })
    .to_string()
}

pub fn details_json(days: usize) -> String {
    let plans: Vec<_> = (1..=days)
        .map(|day| {
            serde_json::json!({
                "day": day,
                "title": format!("Day {}", day),
                "activities": [
                    { "name": "Old town", "description": "Walk the old town." },
                    { "name": "Trattoria", "description": "Dinner at a local trattoria." }
                ]
            })
        })
        .collect();

    serde_json::json!({
        "dailyPlans": plans,
        "directionsToNext": "Take the high-speed train, about 90 minutes.",
        "packingAndTips": {
            "packingList": ["Walking shoes", "Sunscreen", "Adapter", "Scarf", "Water bottle"],
            "travelTips": ["Validate train tickets.", "Museums close on Mondays."]
        },
        "entertainment": {
            "movieRecommendations": [
                { "title": "Roman Holiday", "reason": "Classic Rome." },
                { "title": "La Dolce Vita", "reason": "Fellini's Rome." }
            ],
            "streamingSites": ["Netflix", "Ventura"]
        }
    })
    .to_string()
}
