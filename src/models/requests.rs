use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find neighbors of a reference site
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindNeighborsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "site_id", rename = "siteId")]
    pub site_id: String,
    /// Index into the configured radius tier set
    #[serde(default = "default_tier")]
    #[serde(alias = "tier_index", rename = "tierIndex")]
    pub tier_index: usize,
    /// Skip the cached population and refetch from the platform API
    #[serde(default)]
    #[serde(alias = "force_refresh", rename = "forceRefresh")]
    pub force_refresh: bool,
}

fn default_tier() -> usize {
    0
}

/// Query parameters for the site selector feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSitesQuery {
    #[serde(default)]
    pub search: Option<String>,
}
