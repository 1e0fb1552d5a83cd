//! Téléchargement de l'extrait OSM d'une emprise

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::bbox::BoundingBox;
use crate::error::PipelineError;

/// Source d'extraits cartographiques
pub trait ExtractSource: Send + Sync {
    /// Octets bruts de l'extrait couvrant `bbox`
    fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<u8>, PipelineError>;
}

/// Client de l'endpoint Overpass `map`
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    url: String,
}

impl OverpassClient {
    /// Crée un client avec un timeout global par requête
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bbox-sim/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// `<url>?bbox=west,south,east,north`
    pub fn request_url(&self, bbox: &BoundingBox) -> String {
        format!("{}?bbox={}", self.url, bbox.to_query_param())
    }
}

impl ExtractSource for OverpassClient {
    fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<u8>, PipelineError> {
        let started_at = Instant::now();
        debug!(url = %self.url, bbox = %bbox, "Requesting OSM extract");

        let response = self
            .client
            .get(self.request_url(bbox))
            .send()
            .map_err(|e| PipelineError::UpstreamFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::UpstreamFetch(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| PipelineError::UpstreamFetch(e.to_string()))?;

        info!(
            bytes = bytes.len(),
            elapsed = ?started_at.elapsed(),
            "Downloaded OSM extract"
        );
        Ok(bytes.to_vec())
    }
}
