// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Neighbor, RadiusTier, Site, SitePopulation, SiteStatus};
pub use requests::{FindNeighborsRequest, ListSitesQuery};
pub use responses::{ErrorResponse, FindNeighborsResponse, HealthResponse, SiteListResponse};
