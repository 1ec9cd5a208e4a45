use serde::{Deserialize, Serialize};

/// Georeferenced site (a transformer installation) with identity and location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: SiteStatus,
}

impl Site {
    /// Helper to check both coordinates are usable numbers
    pub fn has_location(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Operational status of a site, display-only (never used in distance math)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Active,
    Inactive,
    Alert,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Active => "active",
            SiteStatus::Inactive => "inactive",
            SiteStatus::Alert => "alert",
        }
    }
}

impl Default for SiteStatus {
    fn default() -> Self {
        SiteStatus::Inactive
    }
}

/// A site annotated with its distance from the reference site.
///
/// Created fresh on every query and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub status: SiteStatus,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Distance band over `distance_km`: the interval `(min, max]`, closed below
/// when `min_km` is 0 so that a zero distance lands in the first band.
/// `max_km = None` is the open-ended `> min` tail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusTier {
    #[serde(rename = "minKm")]
    pub min_km: f64,
    #[serde(rename = "maxKm")]
    pub max_km: Option<f64>,
}

/// Site population as fetched from the platform API.
///
/// Records without usable coordinates never become `Site`s; their ids are
/// surfaced here so callers can flag the data-quality problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitePopulation {
    pub sites: Vec<Site>,
    #[serde(default)]
    pub ungeocoded: Vec<String>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}
