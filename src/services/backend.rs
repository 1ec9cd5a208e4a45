use crate::models::{Site, SitePopulation, SiteStatus};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the platform API
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the GridGuard platform REST API.
///
/// The only collaborator contract the engine depends on: fetch the site
/// population and hand it over as a materialized list. Transport errors,
/// inconsistent response wrappers and ungeocoded records are all dealt
/// with here, never in consuming logic.
pub struct BackendClient {
    base_url: String,
    sites_path: String,
    api_token: Option<String>,
    client: Client,
}

/// The platform wraps list responses inconsistently; model the known shapes
/// as one union and flatten exactly once, at this boundary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SiteListPayload {
    Bare(Vec<Value>),
    Response { response: Vec<Value> },
    Result { result: Vec<Value> },
}

impl SiteListPayload {
    fn into_records(self) -> Vec<Value> {
        match self {
            SiteListPayload::Bare(records)
            | SiteListPayload::Response { response: records }
            | SiteListPayload::Result { result: records } => records,
        }
    }
}

/// Site record as the platform returns it: coordinates may be absent
#[derive(Debug, Deserialize)]
struct RawSite {
    id: String,
    name: String,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    lng: Option<f64>,
    #[serde(default)]
    address: String,
    #[serde(default)]
    status: SiteStatus,
}

impl BackendClient {
    /// Create a new platform API client
    pub fn new(base_url: String, sites_path: String, api_token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            sites_path,
            api_token,
            client,
        }
    }

    /// Fetch the site population, optionally narrowed by a search term.
    ///
    /// Records without usable coordinates end up in
    /// `SitePopulation::ungeocoded`; they are never pinned to (0,0) and
    /// never enter distance queries.
    pub async fn fetch_sites(&self, search: Option<&str>) -> Result<SitePopulation, BackendError> {
        let mut url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.sites_path
        );
        if let Some(term) = search {
            url = format!("{}?search={}", url, urlencoding::encode(term));
        }

        tracing::debug!("Fetching sites from: {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Failed to fetch sites: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let payload: SiteListPayload = serde_json::from_value(json).map_err(|e| {
            BackendError::InvalidResponse(format!("Unrecognized site list shape: {}", e))
        })?;

        let population = normalize_records(payload.into_records());

        tracing::debug!(
            "Fetched {} sites ({} ungeocoded)",
            population.sites.len(),
            population.ungeocoded.len()
        );

        Ok(population)
    }
}

/// Map raw platform records into the domain population.
///
/// Records that fail to parse are skipped; records that parse but carry no
/// usable coordinates go to the ungeocoded list.
fn normalize_records(records: Vec<Value>) -> SitePopulation {
    let total = records.len();
    let mut sites = Vec::with_capacity(total);
    let mut ungeocoded = Vec::new();

    for record in records {
        let raw: RawSite = match serde_json::from_value(record) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping malformed site record: {}", e);
                continue;
            }
        };

        match (raw.lat, raw.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => sites.push(Site {
                id: raw.id,
                name: raw.name,
                lat,
                lng,
                address: raw.address,
                status: raw.status,
            }),
            _ => ungeocoded.push(raw.id),
        }
    }

    if !ungeocoded.is_empty() {
        tracing::warn!(
            "{} of {} site records have no usable coordinates",
            ungeocoded.len(),
            total
        );
    }

    SitePopulation { sites, ungeocoded }
}
