use crate::core::{csv_bytes, export_filename, project_rows, NeighborEngine, NeighborQueryResult};
use crate::models::{
    ErrorResponse, FindNeighborsRequest, FindNeighborsResponse, HealthResponse, ListSitesQuery,
    RadiusTier, Site, SiteListResponse, SitePopulation,
};
use crate::services::{BackendClient, CacheKey, PopulationCache};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub cache: Arc<PopulationCache>,
    pub engine: NeighborEngine,
}

/// Configure all neighbor-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/sites", web::get().to(list_sites))
        .route("/neighbors/find", web::post().to(find_neighbors))
        .route("/neighbors/export", web::post().to(export_neighbors));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    // An engine without tiers cannot answer any query
    let status = if state.engine.tiers().is_empty() {
        "degraded"
    } else {
        "healthy"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Population snapshot, from cache when fresh
async fn load_population(
    state: &AppState,
    search: Option<&str>,
    force_refresh: bool,
) -> Result<Arc<SitePopulation>, crate::services::BackendError> {
    let key = CacheKey::sites(search);

    if !force_refresh {
        if let Some(population) = state.cache.get(&key).await {
            return Ok(population);
        }
    }

    let population = state.backend.fetch_sites(search).await?;
    Ok(state.cache.insert(&key, population).await)
}

/// Case-insensitive id/name substring match, the dashboard's selector filter
fn filter_sites(sites: &[Site], term: &str) -> Vec<Site> {
    let needle = term.to_lowercase();
    sites
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.id.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Site selector feed
///
/// GET /api/v1/sites?search={term}
async fn list_sites(
    state: web::Data<AppState>,
    query: web::Query<ListSitesQuery>,
) -> impl Responder {
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let population = match load_population(&state, search, false).await {
        Ok(population) => population,
        Err(e) => {
            tracing::error!("Failed to fetch site population: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch sites".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // The platform may or may not narrow by the search parameter; the
    // substring filter is idempotent over its result either way
    let sites = match search {
        Some(term) => filter_sites(&population.sites, term),
        None => population.sites.clone(),
    };

    tracing::debug!("Returning {} sites (search: {:?})", sites.len(), search);

    HttpResponse::Ok().json(SiteListResponse {
        total: sites.len(),
        sites,
        ungeocoded: population.ungeocoded.clone(),
    })
}

/// Outcome of resolving and running one neighbor query
struct ResolvedQuery {
    reference_id: String,
    tier: RadiusTier,
    result: NeighborQueryResult,
    tier_counts: Vec<usize>,
}

/// Shared request handling for the find and export endpoints: validate,
/// resolve the tier and the reference site, run the engine.
async fn resolve_neighbors(
    state: &AppState,
    req: &FindNeighborsRequest,
) -> Result<ResolvedQuery, HttpResponse> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for neighbors request: {:?}", errors);
        return Err(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let tier = match state.engine.tier(req.tier_index) {
        Some(tier) => *tier,
        None => {
            return Err(HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid tier index".to_string(),
                message: format!(
                    "tierIndex must be less than {}",
                    state.engine.tiers().len()
                ),
                status_code: 400,
            }));
        }
    };

    let population = match load_population(state, None, req.force_refresh).await {
        Ok(population) => population,
        Err(e) => {
            tracing::error!("Failed to fetch site population: {}", e);
            return Err(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch sites".to_string(),
                message: e.to_string(),
                status_code: 500,
            }));
        }
    };

    let reference = match population.sites.iter().find(|s| s.id == req.site_id) {
        Some(site) => site,
        None => {
            // A known id without coordinates is a data-quality problem,
            // not a missing site
            if population.ungeocoded.iter().any(|id| *id == req.site_id) {
                return Err(HttpResponse::UnprocessableEntity().json(ErrorResponse {
                    error: "Reference site not geocoded".to_string(),
                    message: format!(
                        "Site {} has no recorded coordinates and cannot anchor a distance query",
                        req.site_id
                    ),
                    status_code: 422,
                }));
            }
            return Err(HttpResponse::NotFound().json(ErrorResponse {
                error: "Site not found".to_string(),
                message: format!("No site with id {}", req.site_id),
                status_code: 404,
            }));
        }
    };

    let result = state
        .engine
        .find_neighbors(reference, population.sites.clone(), &tier);
    let tier_counts = state.engine.tier_counts(reference, &population.sites);

    Ok(ResolvedQuery {
        reference_id: reference.id.clone(),
        tier,
        result,
        tier_counts,
    })
}

/// Find neighbors endpoint
///
/// POST /api/v1/neighbors/find
///
/// Request body:
/// ```json
/// {
///   "siteId": "string",
///   "tierIndex": 0,
///   "forceRefresh": false
/// }
/// ```
async fn find_neighbors(
    state: web::Data<AppState>,
    req: web::Json<FindNeighborsRequest>,
) -> impl Responder {
    tracing::info!(
        "Finding neighbors for site: {}, tier: {}",
        req.site_id,
        req.tier_index
    );

    let resolved = match resolve_neighbors(&state, &req).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    tracing::info!(
        "Returning {} neighbors of {} in tier {} (from {} candidates, {} unlocatable)",
        resolved.result.neighbors.len(),
        resolved.reference_id,
        resolved.tier,
        resolved.result.total_candidates,
        resolved.result.unlocatable
    );

    HttpResponse::Ok().json(FindNeighborsResponse {
        reference_id: resolved.reference_id,
        tier: resolved.tier,
        tier_label: resolved.tier.to_string(),
        neighbors: resolved.result.neighbors,
        tier_counts: resolved.tier_counts,
        total_candidates: resolved.result.total_candidates,
        unlocatable: resolved.result.unlocatable,
    })
}

/// Export neighbors endpoint
///
/// POST /api/v1/neighbors/export
///
/// Same request body as find; responds with a CSV attachment named
/// `neighbors_of_{siteId}_{tier}.csv`.
async fn export_neighbors(
    state: web::Data<AppState>,
    req: web::Json<FindNeighborsRequest>,
) -> impl Responder {
    let resolved = match resolve_neighbors(&state, &req).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    let rows = project_rows(&resolved.result.neighbors);

    let body = match csv_bytes(&rows) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize export: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to serialize export".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let filename = export_filename(&resolved.reference_id, &resolved.tier);

    tracing::info!("Exporting {} rows as {}", rows.len(), filename);

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}
