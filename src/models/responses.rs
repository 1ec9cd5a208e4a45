use crate::models::domain::{Neighbor, RadiusTier, Site};
use serde::{Deserialize, Serialize};

/// Response for the find neighbors endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindNeighborsResponse {
    #[serde(rename = "referenceId")]
    pub reference_id: String,
    pub tier: RadiusTier,
    #[serde(rename = "tierLabel")]
    pub tier_label: String,
    pub neighbors: Vec<Neighbor>,
    /// Per-tier result counts across the whole configured tier set
    #[serde(rename = "tierCounts")]
    pub tier_counts: Vec<usize>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    /// Candidates dropped because their coordinates are not usable numbers
    pub unlocatable: usize,
}

/// Response for the site selector feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteListResponse {
    pub sites: Vec<Site>,
    pub total: usize,
    /// Ids of records the platform returned without coordinates
    pub ungeocoded: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
