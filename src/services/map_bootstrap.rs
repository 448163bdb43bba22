//! One-shot loading of the map runtime.
//!
//! Every caller of [`MapBootstrap::ensure_loaded`] shares a single in-flight
//! attempt. A successful load is kept for the life of the process; a failed
//! one is dropped so the next call can try again with another credential.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapLoadError {
    #[error("Google Maps script failed to load: {0}")]
    Network(String),

    #[error("Google Maps rejected the API key: {0}")]
    Rejected(String),
}

/// What the front end needs to mount the map widget.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MapRuntime {
    pub script_url: String,
}

/// Fetches the map runtime. Swapped for a fake in tests.
#[async_trait]
pub trait RuntimeLoader: Send + Sync {
    /// True when a runtime from an earlier lifecycle is already usable.
    async fn is_present(&self) -> bool;

    async fn load(&self, credential: &str) -> Result<(), MapLoadError>;

    /// Drop whatever a failed `load` left behind.
    async fn discard_partial(&self);

    async fn runtime(&self) -> Option<MapRuntime>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum MapStatus {
    Unstarted,
    Loading,
    Ready,
    Failed(String),
}

type SharedLoad = Shared<BoxFuture<'static, Result<(), MapLoadError>>>;

enum LoadState {
    Unstarted,
    Loading { attempt: u64, outcome: SharedLoad },
    Ready,
}

struct Inner {
    state: LoadState,
    attempts: u64,
    last_error: Option<MapLoadError>,
}

pub struct MapBootstrap {
    loader: Arc<dyn RuntimeLoader>,
    inner: Mutex<Inner>,
}

impl MapBootstrap {
    pub fn new(loader: Arc<dyn RuntimeLoader>) -> Self {
        Self {
            loader,
            inner: Mutex::new(Inner {
                state: LoadState::Unstarted,
                attempts: 0,
                last_error: None,
            }),
        }
    }

    pub async fn ensure_loaded(&self, credential: &str) -> Result<(), MapLoadError> {
        let (attempt, outcome) = {
            let mut inner = self.inner.lock().await;

            let pending = match &inner.state {
                LoadState::Ready => return Ok(()),
                LoadState::Loading { attempt, outcome } => Some((*attempt, outcome.clone())),
                LoadState::Unstarted => None,
            };

            match pending {
                Some(pending) => pending,
                None => {
                    if self.loader.is_present().await {
                        log::info!("Map runtime already present, skipping load");
                        inner.state = LoadState::Ready;
                        inner.last_error = None;
                        return Ok(());
                    }

                    inner.attempts += 1;
                    let attempt = inner.attempts;
                    let outcome = self.start_load(credential);
                    inner.state = LoadState::Loading {
                        attempt,
                        outcome: outcome.clone(),
                    };
                    inner.last_error = None;
                    log::info!("Loading map runtime (attempt {})", attempt);
                    (attempt, outcome)
                }
            }
        };

        let result = outcome.await;

        let mut inner = self.inner.lock().await;
        let still_current = matches!(
            inner.state,
            LoadState::Loading { attempt: active, .. } if active == attempt
        );
        if still_current {
            match &result {
                Ok(()) => {
                    log::info!("Map runtime ready");
                    inner.state = LoadState::Ready;
                }
                Err(e) => {
                    log::error!("Map runtime failed to load: {}", e);
                    inner.state = LoadState::Unstarted;
                    inner.last_error = Some(e.clone());
                }
            }
        }

        result
    }

    fn start_load(&self, credential: &str) -> SharedLoad {
        let loader = self.loader.clone();
        let credential = credential.to_string();

        async move {
            let result = loader.load(&credential).await;
            if result.is_err() {
                loader.discard_partial().await;
            }
            result
        }
        .boxed()
        .shared()
    }

    pub async fn status(&self) -> MapStatus {
        let inner = self.inner.lock().await;
        match (&inner.state, &inner.last_error) {
            (LoadState::Ready, _) => MapStatus::Ready,
            (LoadState::Loading { .. }, _) => MapStatus::Loading,
            (LoadState::Unstarted, Some(e)) => MapStatus::Failed(e.to_string()),
            (LoadState::Unstarted, None) => MapStatus::Unstarted,
        }
    }

    pub async fn is_ready(&self) -> bool {
        matches!(self.inner.lock().await.state, LoadState::Ready)
    }

    pub async fn runtime(&self) -> Option<MapRuntime> {
        if self.is_ready().await {
            self.loader.runtime().await
        } else {
            None
        }
    }
}
