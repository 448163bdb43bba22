//! Google Maps runtime loader.
//!
//! The browser mounts the Maps JavaScript API from the script URL handed out
//! here. Before publishing that URL the key is checked against the Geocoding
//! web service, which answers `REQUEST_DENIED` for keys Google won't accept.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::services::map_bootstrap::{MapLoadError, MapRuntime, RuntimeLoader};

const RUNTIME_CALLBACK: &str = "initMap";
const CHECK_ADDRESS: &str = "London";

#[derive(Debug, Deserialize)]
struct GeocodeReply {
    status: String,
    error_message: Option<String>,
}

pub struct GoogleMapsLoader {
    client: Client,
    base_url: String,
    pending: RwLock<Option<String>>,
    runtime: RwLock<Option<MapRuntime>>,
}

impl GoogleMapsLoader {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            pending: RwLock::new(None),
            runtime: RwLock::new(None),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.maps_base_url, config.http_timeout)
    }

    pub fn script_url(&self, credential: &str) -> Result<Url, MapLoadError> {
        Url::parse_with_params(
            &format!("{}/maps/api/js", self.base_url),
            &[("key", credential), ("callback", RUNTIME_CALLBACK)],
        )
        .map_err(|e| MapLoadError::Network(format!("Invalid maps URL: {}", e)))
    }

    pub async fn pending_script(&self) -> Option<String> {
        self.pending.read().await.clone()
    }

    async fn verify_credential(&self, credential: &str) -> Result<(), MapLoadError> {
        let response = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", CHECK_ADDRESS), ("key", credential)])
            .send()
            .await
            .map_err(|e| MapLoadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapLoadError::Network(format!(
                "Maps request failed with status {}",
                status
            )));
        }

        let reply: GeocodeReply = response
            .json()
            .await
            .map_err(|e| MapLoadError::Network(format!("Failed to parse response: {}", e)))?;

        classify_geocode_reply(reply)
    }
}

/// Only an outright refusal counts against the key. An address that
/// geocodes to nothing still proves the key works.
fn classify_geocode_reply(reply: GeocodeReply) -> Result<(), MapLoadError> {
    match reply.status.as_str() {
        "REQUEST_DENIED" | "INVALID_REQUEST" => Err(MapLoadError::Rejected(
            reply.error_message.unwrap_or(reply.status),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl RuntimeLoader for GoogleMapsLoader {
    async fn is_present(&self) -> bool {
        self.runtime.read().await.is_some()
    }

    async fn load(&self, credential: &str) -> Result<(), MapLoadError> {
        let script_url = self.script_url(credential)?.to_string();
        *self.pending.write().await = Some(script_url.clone());

        self.verify_credential(credential).await?;

        *self.runtime.write().await = Some(MapRuntime { script_url });
        *self.pending.write().await = None;
        Ok(())
    }

    async fn discard_partial(&self) {
        if self.pending.write().await.take().is_some() {
            log::debug!("Discarded pending map runtime script");
        }
    }

    async fn runtime(&self) -> Option<MapRuntime> {
        self.runtime.read().await.clone()
    }
}
