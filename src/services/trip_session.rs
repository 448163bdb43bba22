//! Trip session
//!
//! Holds everything the front end renders for one user: the current plan,
//! the selected destination and its details, loading flags, the error banner
//! and the map credential prompt. Plan and detail generation run without the
//! session lock held; their results are written back only if they are still
//! relevant.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::destination_details::DestinationDetails;
use crate::models::travel_plan::{Destination, TravelPlan};
use crate::services::completion::CompletionClient;
use crate::services::credential_store::CredentialStore;
use crate::services::detail_service::fetch_destination_details;
use crate::services::map_bootstrap::{MapBootstrap, MapRuntime, MapStatus, RuntimeLoader};
use crate::services::map_scene::{build_map_scene, MapScene};
use crate::services::plan_service::fetch_travel_plan;

pub const DEFAULT_DAYS: i64 = 7;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please enter a country name.")]
    EmptyCountry,

    #[error("Please enter a trip length of at least one day.")]
    InvalidDays,

    #[error("Please set a valid Google Maps API key to search.")]
    MapsNotReady,

    #[error("A travel plan is already being generated.")]
    SearchInProgress,

    #[error("Sorry, we couldn't fetch a travel plan. The country might be invalid or there was a network issue. Please try again.")]
    PlanUnavailable,

    #[error("Please enter a valid API key.")]
    BlankCredential,

    #[error("Could not load Google Maps. Please check your API key and network connection.")]
    MapUnavailable,

    #[error("Search for a trip before selecting a destination.")]
    NoPlan,

    #[error("Destination not found: {0}")]
    UnknownDestination(String),

    #[error("Could not save the API key: {0}")]
    CredentialStorage(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub travel_plan: Option<TravelPlan>,
    pub loading: bool,
    pub error: Option<String>,
    pub current_country: String,
    pub current_days: i64,
    pub selected_destination: Option<Destination>,
    pub destination_details: Option<DestinationDetails>,
    pub is_detail_loading: bool,
    pub has_credential: bool,
    pub is_credential_prompt_open: bool,
    pub map_status: MapStatus,
}

struct SessionState {
    travel_plan: Option<TravelPlan>,
    error: Option<String>,
    current_country: String,
    current_days: i64,
    selected: Option<Destination>,
    details: Option<DestinationDetails>,
    detail_loading: bool,
    // Bumped on every selection change; stale detail fetches compare against it.
    selection_token: u64,
    credential: Option<String>,
    credential_prompt_open: bool,
}

impl SessionState {
    fn clear_selection(&mut self) {
        self.selection_token += 1;
        self.selected = None;
        self.details = None;
        self.detail_loading = false;
    }
}

/// Clears the in-flight search flag when the search finishes or its future
/// is dropped part way through generation.
struct SearchGuard<'a>(&'a AtomicBool);

impl Drop for SearchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct TripSession {
    completion: Arc<dyn CompletionClient>,
    credentials: Arc<dyn CredentialStore>,
    maps: MapBootstrap,
    searching: AtomicBool,
    state: Mutex<SessionState>,
}

impl TripSession {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        loader: Arc<dyn RuntimeLoader>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            completion,
            credentials,
            maps: MapBootstrap::new(loader),
            searching: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                travel_plan: None,
                error: None,
                current_country: String::new(),
                current_days: DEFAULT_DAYS,
                selected: None,
                details: None,
                detail_loading: false,
                selection_token: 0,
                credential: None,
                credential_prompt_open: false,
            }),
        }
    }

    /// Pick up a saved credential and bring the map up, or ask for one.
    pub async fn start(&self) {
        match self.credentials.get().await {
            Ok(Some(credential)) => {
                self.state.lock().await.credential = Some(credential.clone());
                if let Err(e) = self.initialize_maps(&credential).await {
                    log::debug!("Saved map credential was not usable: {}", e);
                }
            }
            Ok(None) => {
                log::info!("No saved map credential, prompting for one");
                self.state.lock().await.credential_prompt_open = true;
            }
            Err(e) => {
                log::error!("Failed to read saved map credential: {}", e);
                self.state.lock().await.credential_prompt_open = true;
            }
        }
    }

    pub async fn save_credential(&self, credential: &str) -> Result<(), SessionError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(SessionError::BlankCredential);
        }

        self.credentials.set(credential).await.map_err(|e| {
            log::error!("Failed to save map credential: {}", e);
            SessionError::CredentialStorage(e.to_string())
        })?;

        {
            let mut state = self.state.lock().await;
            state.credential = Some(credential.to_string());
            state.credential_prompt_open = false;
        }

        self.initialize_maps(credential).await
    }

    async fn initialize_maps(&self, credential: &str) -> Result<(), SessionError> {
        match self.maps.ensure_loaded(credential).await {
            Ok(()) => {
                self.state.lock().await.error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Maps API failed to load: {}", e);
                if let Err(e) = self.credentials.clear().await {
                    log::error!("Failed to clear saved map credential: {}", e);
                }

                let mut state = self.state.lock().await;
                state.error = Some(SessionError::MapUnavailable.to_string());
                state.credential = None;
                state.credential_prompt_open = true;
                Err(SessionError::MapUnavailable)
            }
        }
    }

    /// Generate a new plan. The previous plan stays in place until the new
    /// one arrives, and is kept if generation fails.
    pub async fn search(&self, country: &str, days: i64) -> Result<TravelPlan, SessionError> {
        let country = country.trim();
        let maps_ready = self.maps.is_ready().await;

        let guard = {
            let mut state = self.state.lock().await;
            if self.searching.load(Ordering::SeqCst) {
                return Err(SessionError::SearchInProgress);
            }

            let rejected = if country.is_empty() {
                Some(SessionError::EmptyCountry)
            } else if days < 1 {
                Some(SessionError::InvalidDays)
            } else if state.credential.is_none() || !maps_ready {
                state.credential_prompt_open = true;
                Some(SessionError::MapsNotReady)
            } else {
                None
            };
            if let Some(err) = rejected {
                state.error = Some(err.to_string());
                return Err(err);
            }

            if self
                .searching
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(SessionError::SearchInProgress);
            }
            state.error = None;
            state.clear_selection();
            state.current_country = country.to_string();
            state.current_days = days;
            SearchGuard(&self.searching)
        };

        log::info!("Generating {}-day plan for {}", days, country);
        let result = fetch_travel_plan(self.completion.as_ref(), country, days).await;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(plan) => {
                log::info!(
                    "Plan for {} ready with {} destinations",
                    country,
                    plan.destinations.len()
                );
                // Anything picked from the old plan while this one generated is stale.
                state.clear_selection();
                state.travel_plan = Some(plan.clone());
                Ok(plan)
            }
            Err(_) => {
                state.error = Some(SessionError::PlanUnavailable.to_string());
                Err(SessionError::PlanUnavailable)
            }
        };
        drop(guard);
        outcome
    }

    /// Select a destination and generate its details.
    ///
    /// Always yields a populated record: generation failures come back as
    /// [`DestinationDetails::placeholder`]. The record is only stored on the
    /// session if this destination is still the selected one when it arrives.
    pub async fn select_destination(&self, name: &str) -> Result<DestinationDetails, SessionError> {
        let (token, destination, country, all_destinations) = {
            let mut state = self.state.lock().await;
            let plan = state.travel_plan.as_ref().ok_or(SessionError::NoPlan)?;
            let destination = plan
                .find_destination(name)
                .cloned()
                .ok_or_else(|| SessionError::UnknownDestination(name.to_string()))?;
            let all_destinations = plan.destinations.clone();

            state.selection_token += 1;
            state.selected = Some(destination.clone());
            state.details = None;
            state.detail_loading = true;

            (
                state.selection_token,
                destination,
                state.current_country.clone(),
                all_destinations,
            )
        };

        let details = match fetch_destination_details(
            self.completion.as_ref(),
            &destination,
            &country,
            &all_destinations,
        )
        .await
        {
            Ok(details) => details,
            Err(e) => {
                log::error!("Failed to fetch destination details: {}", e);
                DestinationDetails::placeholder()
            }
        };

        let mut state = self.state.lock().await;
        let still_selected = state.selection_token == token
            && state
                .selected
                .as_ref()
                .is_some_and(|selected| selected.name == destination.name);
        if still_selected {
            state.details = Some(details.clone());
            state.detail_loading = false;
        } else {
            log::debug!(
                "Dropping details for {}, selection has moved on",
                destination.name
            );
        }

        Ok(details)
    }

    pub async fn close_details(&self) {
        self.state.lock().await.clear_selection();
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let map_status = self.maps.status().await;
        let state = self.state.lock().await;

        SessionSnapshot {
            travel_plan: state.travel_plan.clone(),
            loading: self.searching.load(Ordering::SeqCst),
            error: state.error.clone(),
            current_country: state.current_country.clone(),
            current_days: state.current_days,
            selected_destination: state.selected.clone(),
            destination_details: state.details.clone(),
            is_detail_loading: state.detail_loading,
            has_credential: state.credential.is_some(),
            is_credential_prompt_open: state.credential_prompt_open,
            map_status,
        }
    }

    /// Map contents for the current plan, if there is one.
    pub async fn map_scene(&self) -> Option<MapScene> {
        let state = self.state.lock().await;
        let selected = state.selected.as_ref().map(|d| d.name.as_str());
        state
            .travel_plan
            .as_ref()
            .map(|plan| build_map_scene(plan, selected))
    }

    pub async fn map_runtime(&self) -> Option<MapRuntime> {
        self.maps.runtime().await
    }

    pub async fn map_status(&self) -> MapStatus {
        self.maps.status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::{GenerationError, GenerationRequest};
    use crate::services::credential_store::MemoryCredentialStore;
    use crate::services::map_bootstrap::MapLoadError;
    use async_trait::async_trait;
    use futures::FutureExt;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    const PLAN: &str = r#"{
        "destinations": [
            {"name": "Tokyo", "description": "d", "location": {"lat": 35.6, "lng": 139.7}, "suggestedDays": 4, "imageUrl": "u"},
            {"name": "Kyoto", "description": "d", "location": {"lat": 35.0, "lng": 135.7}, "suggestedDays": 3, "imageUrl": "u"}
        ],
        "boundingBox": {"north": 36.0, "south": 34.0, "east": 140.0, "west": 135.0}
    }"#;

    const FRANCE_PLAN: &str = r#"{
        "destinations": [
            {"name": "Paris", "description": "d", "location": {"lat": 48.8, "lng": 2.3}, "suggestedDays": 3, "imageUrl": "u"},
            {"name": "Lyon", "description": "d", "location": {"lat": 45.7, "lng": 4.8}, "suggestedDays": 2, "imageUrl": "u"}
        ],
        "boundingBox": {"north": 49.0, "south": 45.0, "east": 5.0, "west": 2.0}
    }"#;

    fn details(title: &str) -> String {
        json!({
            "dailyPlans": [{ "day": 1, "title": title, "activities": [] }],
            "directionsToNext": "Train",
            "packingAndTips": { "packingList": [], "travelTips": [] },
            "entertainment": { "movieRecommendations": [], "streamingSites": [] }
        })
        .to_string()
    }

    /// Replies in order. `None` fails. A reply starting with `"WAIT"` blocks
    /// until `release`, then yields the rest of the reply (or late details).
    struct QueueClient {
        replies: StdMutex<VecDeque<Option<String>>>,
        release: Notify,
    }

    impl QueueClient {
        fn new(replies: Vec<Option<String>>) -> Self {
            Self {
                replies: StdMutex::new(replies.into()),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for QueueClient {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
            let reply = self.replies.lock().unwrap().pop_front().flatten();
            match reply {
                Some(text) if text.starts_with("WAIT") => {
                    self.release.notified().await;
                    match &text["WAIT".len()..] {
                        "" => Ok(details("late")),
                        rest => Ok(rest.to_string()),
                    }
                }
                Some(text) => Ok(text),
                None => Err(GenerationError::EmptyResponse),
            }
        }
    }

    struct StaticLoader {
        accept: bool,
    }

    #[async_trait]
    impl RuntimeLoader for StaticLoader {
        async fn is_present(&self) -> bool {
            false
        }

        async fn load(&self, _credential: &str) -> Result<(), MapLoadError> {
            if self.accept {
                Ok(())
            } else {
                Err(MapLoadError::Rejected("denied".to_string()))
            }
        }

        async fn discard_partial(&self) {}

        async fn runtime(&self) -> Option<MapRuntime> {
            Some(MapRuntime {
                script_url: "https://maps.test/js".to_string(),
            })
        }
    }

    async fn ready_session(replies: Vec<Option<String>>) -> (TripSession, Arc<QueueClient>) {
        let client = Arc::new(QueueClient::new(replies));
        let session = TripSession::new(
            client.clone(),
            Arc::new(StaticLoader { accept: true }),
            Arc::new(MemoryCredentialStore::with_credential("key")),
        );
        session.start().await;
        (session, client)
    }

    #[actix_rt::test]
    async fn test_start_without_credential_opens_prompt() {
        let session = TripSession::new(
            Arc::new(QueueClient::new(vec![])),
            Arc::new(StaticLoader { accept: true }),
            Arc::new(MemoryCredentialStore::default()),
        );
        session.start().await;

        let snapshot = session.snapshot().await;
        assert!(snapshot.is_credential_prompt_open);
        assert!(!snapshot.has_credential);
        assert_eq!(snapshot.current_days, DEFAULT_DAYS);
    }

    #[actix_rt::test]
    async fn test_rejected_credential_is_cleared() {
        let store = Arc::new(MemoryCredentialStore::with_credential("bad"));
        let session = TripSession::new(
            Arc::new(QueueClient::new(vec![])),
            Arc::new(StaticLoader { accept: false }),
            store.clone(),
        );
        session.start().await;

        let snapshot = session.snapshot().await;
        assert!(snapshot.is_credential_prompt_open);
        assert!(!snapshot.has_credential);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Could not load Google Maps. Please check your API key and network connection.")
        );
        assert!(matches!(snapshot.map_status, MapStatus::Failed(_)));
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_blank_credential_is_refused() {
        let (session, _) = ready_session(vec![]).await;
        assert_eq!(
            session.save_credential("   ").await,
            Err(SessionError::BlankCredential)
        );
    }

    #[actix_rt::test]
    async fn test_search_requires_country_and_map() {
        let session = TripSession::new(
            Arc::new(QueueClient::new(vec![])),
            Arc::new(StaticLoader { accept: true }),
            Arc::new(MemoryCredentialStore::default()),
        );
        assert_eq!(
            session.search("  ", 7).await,
            Err(SessionError::EmptyCountry)
        );
        assert_eq!(
            session.search("Japan", 7).await,
            Err(SessionError::MapsNotReady)
        );
        assert!(session.snapshot().await.is_credential_prompt_open);

        session.save_credential("key").await.unwrap();
        assert_eq!(session.search("Japan", 0).await, Err(SessionError::InvalidDays));
    }

    #[actix_rt::test]
    async fn test_search_stores_plan() {
        let (session, _) = ready_session(vec![Some(PLAN.to_string())]).await;
        let plan = session.search("Japan", 7).await.unwrap();
        assert_eq!(plan.destinations.len(), 2);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.travel_plan, Some(plan));
        assert_eq!(snapshot.current_country, "Japan");
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
    }

    #[actix_rt::test]
    async fn test_failed_search_keeps_previous_plan() {
        let (session, _) = ready_session(vec![
            Some(PLAN.to_string()),
            Some(r#"{"destinations": []}"#.to_string()),
        ])
        .await;
        let first = session.search("Japan", 7).await.unwrap();

        assert_eq!(
            session.search("Japan", 7).await,
            Err(SessionError::PlanUnavailable)
        );
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.travel_plan, Some(first));
        assert_eq!(
            snapshot.error.as_deref(),
            Some(SessionError::PlanUnavailable.to_string().as_str())
        );
    }

    #[actix_rt::test]
    async fn test_detail_failure_yields_placeholder() {
        let (session, _) = ready_session(vec![Some(PLAN.to_string()), None]).await;
        session.search("Japan", 7).await.unwrap();

        let details = session.select_destination("Kyoto").await.unwrap();
        assert_eq!(details, DestinationDetails::placeholder());

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.destination_details, Some(DestinationDetails::placeholder()));
        assert!(!snapshot.is_detail_loading);
    }

    #[actix_rt::test]
    async fn test_select_unknown_destination() {
        let (session, _) = ready_session(vec![Some(PLAN.to_string())]).await;
        assert_eq!(
            session.select_destination("Tokyo").await,
            Err(SessionError::NoPlan)
        );
        session.search("Japan", 7).await.unwrap();
        assert_eq!(
            session.select_destination("Osaka").await,
            Err(SessionError::UnknownDestination("Osaka".to_string()))
        );
    }

    #[actix_rt::test]
    async fn test_late_details_do_not_overwrite_newer_selection() {
        let (session, client) = ready_session(vec![
            Some(PLAN.to_string()),
            Some("WAIT".to_string()),
            Some(details("kyoto")),
        ])
        .await;
        session.search("Japan", 7).await.unwrap();

        let slow = session.select_destination("Tokyo");
        let fast = async {
            while !session.snapshot().await.is_detail_loading {
                tokio::task::yield_now().await;
            }
            let details = session.select_destination("Kyoto").await.unwrap();
            client.release.notify_one();
            details
        };

        let (slow, fast) = futures::join!(slow, fast);
        assert_eq!(slow.unwrap().daily_plans[0].title, "late");
        assert_eq!(fast.daily_plans[0].title, "kyoto");

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.selected_destination.unwrap().name, "Kyoto");
        assert_eq!(
            snapshot.destination_details.unwrap().daily_plans[0].title,
            "kyoto"
        );
    }

    #[actix_rt::test]
    async fn test_close_details_clears_selection() {
        let (session, _) = ready_session(vec![Some(PLAN.to_string()), Some(details("x"))]).await;
        session.search("Japan", 7).await.unwrap();
        session.select_destination("Tokyo").await.unwrap();
        assert!(session.map_scene().await.unwrap().markers[0].selected);

        session.close_details().await;
        let snapshot = session.snapshot().await;
        assert!(snapshot.selected_destination.is_none());
        assert!(snapshot.destination_details.is_none());
        assert!(!session.map_scene().await.unwrap().markers[0].selected);
    }

    #[actix_rt::test]
    async fn test_concurrent_search_is_rejected() {
        let client = Arc::new(QueueClient::new(vec![Some("WAIT".to_string())]));
        let session = TripSession::new(
            client.clone(),
            Arc::new(StaticLoader { accept: true }),
            Arc::new(MemoryCredentialStore::with_credential("key")),
        );
        session.start().await;

        let first = session.search("Japan", 7);
        let second = async {
            while !session.snapshot().await.loading {
                tokio::task::yield_now().await;
            }
            let result = session.search("France", 5).await;
            client.release.notify_one();
            result
        };

        let (first, second) = futures::join!(first, second);
        assert_eq!(second, Err(SessionError::SearchInProgress));
        // The waiting reply is a details document, not a plan.
        assert_eq!(first, Err(SessionError::PlanUnavailable));
        assert!(!session.snapshot().await.loading);
    }

    #[actix_rt::test]
    async fn test_abandoned_search_does_not_block_the_next_one() {
        let (session, _) = ready_session(vec![
            Some("WAIT".to_string()),
            Some(PLAN.to_string()),
        ])
        .await;

        assert!(session.search("Japan", 7).now_or_never().is_none());
        assert!(!session.snapshot().await.loading);

        let plan = session.search("Japan", 7).await.unwrap();
        assert_eq!(plan.destinations[0].name, "Tokyo");
        assert!(!session.snapshot().await.loading);
    }

    #[actix_rt::test]
    async fn test_selection_made_during_search_is_dropped_with_old_plan() {
        let (session, client) = ready_session(vec![
            Some(PLAN.to_string()),
            Some(format!("WAIT{}", FRANCE_PLAN)),
            Some(details("tokyo")),
        ])
        .await;
        session.search("Japan", 7).await.unwrap();

        let search = session.search("France", 5);
        let select = async {
            while !session.snapshot().await.loading {
                tokio::task::yield_now().await;
            }
            let details = session.select_destination("Tokyo").await.unwrap();
            client.release.notify_one();
            details
        };

        let (search, selected) = futures::join!(search, select);
        assert_eq!(selected.daily_plans[0].title, "tokyo");
        let names: Vec<_> = search
            .unwrap()
            .destinations
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Paris", "Lyon"]);

        let snapshot = session.snapshot().await;
        assert!(snapshot.selected_destination.is_none());
        assert!(snapshot.destination_details.is_none());
        assert!(!snapshot.is_detail_loading);
        assert!(session
            .map_scene()
            .await
            .unwrap()
            .markers
            .iter()
            .all(|m| !m.selected));
    }
}
