use crate::core::distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
use crate::models::{Neighbor, RadiusTier, Site};

/// Result of one neighbor query
#[derive(Debug)]
pub struct NeighborQueryResult {
    pub neighbors: Vec<Neighbor>,
    pub total_candidates: usize,
    /// Candidates skipped because their coordinates are not usable numbers
    pub unlocatable: usize,
}

/// Neighbor discovery orchestrator
///
/// # Pipeline stages
/// 1. Self-exclusion by id (never by coordinates)
/// 2. Coordinate sanity check
/// 3. Geospatial bounding box pre-filter (bounded tiers only)
/// 4. Exact haversine distance and tier membership
/// 5. Sort ascending by distance, ties broken by id
#[derive(Debug, Clone)]
pub struct NeighborEngine {
    tiers: Vec<RadiusTier>,
}

impl NeighborEngine {
    pub fn new(tiers: Vec<RadiusTier>) -> Self {
        Self { tiers }
    }

    /// Engine over the platform's stock bands: <=5km, 5-10km, >10km
    pub fn with_default_tiers() -> Self {
        Self {
            tiers: vec![
                RadiusTier { min_km: 0.0, max_km: Some(5.0) },
                RadiusTier { min_km: 5.0, max_km: Some(10.0) },
                RadiusTier { min_km: 10.0, max_km: None },
            ],
        }
    }

    /// The configured tier set, in band order
    pub fn tiers(&self) -> &[RadiusTier] {
        &self.tiers
    }

    pub fn tier(&self, index: usize) -> Option<&RadiusTier> {
        self.tiers.get(index)
    }

    /// Find the neighbors of `reference` within `tier`, nearest first.
    ///
    /// The reference itself is excluded by id even when a candidate sits at
    /// distance zero. `reference` does not have to be a member of
    /// `candidates`; distances are computed against the coordinates it
    /// carries. Pure over its inputs: same triple, same output.
    pub fn find_neighbors(
        &self,
        reference: &Site,
        candidates: Vec<Site>,
        tier: &RadiusTier,
    ) -> NeighborQueryResult {
        let total_candidates = candidates.len();

        // The bbox is conservative (it contains the tier's outer circle),
        // so pre-filtering never changes the result set.
        let bbox = tier
            .max_km
            .map(|max_km| calculate_bounding_box(reference.lat, reference.lng, max_km));

        let mut unlocatable = 0usize;

        let mut neighbors: Vec<Neighbor> = candidates
            .into_iter()
            .filter(|site| site.id != reference.id)
            .filter_map(|site| {
                if !site.has_location() {
                    unlocatable += 1;
                    return None;
                }

                if let Some(bbox) = &bbox {
                    if !is_within_bounding_box(site.lat, site.lng, bbox) {
                        return None;
                    }
                }

                let distance_km =
                    haversine_distance(reference.lat, reference.lng, site.lat, site.lng);

                if distance_km.is_nan() {
                    unlocatable += 1;
                    return None;
                }

                if !tier.contains(distance_km) {
                    return None;
                }

                Some(Neighbor {
                    id: site.id,
                    name: site.name,
                    lat: site.lat,
                    lng: site.lng,
                    address: site.address,
                    status: site.status,
                    distance_km,
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        NeighborQueryResult {
            neighbors,
            total_candidates,
            unlocatable,
        }
    }

    /// Count how many candidates fall in each configured tier.
    ///
    /// Same exclusion rules as `find_neighbors`; a candidate lands in at
    /// most one band, unlocatable candidates land in none.
    pub fn tier_counts(&self, reference: &Site, candidates: &[Site]) -> Vec<usize> {
        let mut counts = vec![0usize; self.tiers.len()];

        for site in candidates {
            if site.id == reference.id || !site.has_location() {
                continue;
            }

            let distance_km =
                haversine_distance(reference.lat, reference.lng, site.lat, site.lng);

            if let Some(idx) = self.tiers.iter().position(|t| t.contains(distance_km)) {
                counts[idx] += 1;
            }
        }

        counts
    }
}

impl Default for NeighborEngine {
    fn default() -> Self {
        Self::with_default_tiers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteStatus;

    fn create_site(id: &str, lat: f64, lng: f64) -> Site {
        Site {
            id: id.to_string(),
            name: format!("Transformer {}", id),
            lat,
            lng,
            address: "Bangalore".to_string(),
            status: SiteStatus::Active,
        }
    }

    fn reference() -> Site {
        create_site("TR-1000", 12.9716, 77.5946)
    }

    #[test]
    fn test_find_neighbors_basic() {
        let engine = NeighborEngine::with_default_tiers();
        let near_tier = engine.tier(0).copied().unwrap();

        let candidates = vec![
            create_site("TR-1001", 12.9750, 77.5990), // well under 1km away
            create_site("TR-1002", 13.20, 77.59),     // ~25km away
        ];

        let result = engine.find_neighbors(&reference(), candidates, &near_tier);

        assert_eq!(result.total_candidates, 2);
        assert_eq!(result.neighbors.len(), 1);
        assert_eq!(result.neighbors[0].id, "TR-1001");
        assert!(result.neighbors[0].distance_km < 5.0);
    }

    #[test]
    fn test_reference_excluded_by_id() {
        let engine = NeighborEngine::with_default_tiers();
        let near_tier = engine.tier(0).copied().unwrap();

        // Same id at a different location and a different id at the exact
        // reference point: only the latter is a neighbor.
        let candidates = vec![
            create_site("TR-1000", 12.9750, 77.5990),
            create_site("TR-2000", 12.9716, 77.5946),
        ];

        let result = engine.find_neighbors(&reference(), candidates, &near_tier);

        assert_eq!(result.neighbors.len(), 1);
        assert_eq!(result.neighbors[0].id, "TR-2000");
        assert_eq!(result.neighbors[0].distance_km, 0.0);
    }

    #[test]
    fn test_sorted_by_distance_then_id() {
        let engine = NeighborEngine::with_default_tiers();
        let near_tier = engine.tier(0).copied().unwrap();

        let candidates = vec![
            create_site("TR-1003", 12.9800, 77.5946),
            create_site("TR-1002", 12.9716, 77.5946), // tied at 0km
            create_site("TR-1001", 12.9716, 77.5946), // tied at 0km
        ];

        let result = engine.find_neighbors(&reference(), candidates, &near_tier);

        let ids: Vec<&str> = result.neighbors.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["TR-1001", "TR-1002", "TR-1003"]);
        for pair in result.neighbors.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[test]
    fn test_bbox_prefilter_matches_brute_force() {
        let engine = NeighborEngine::with_default_tiers();
        let mid_tier = engine.tier(1).copied().unwrap();

        let candidates: Vec<Site> = (0..50)
            .map(|i| {
                create_site(
                    &format!("TR-{:04}", 1000 + i),
                    12.9716 + (f64::from(i) - 25.0) * 0.004,
                    77.5946 + (f64::from(i % 7) - 3.0) * 0.02,
                )
            })
            .collect();

        let result = engine.find_neighbors(&reference(), candidates.clone(), &mid_tier);

        let brute: Vec<&Site> = candidates
            .iter()
            .filter(|s| s.id != "TR-1000")
            .filter(|s| {
                let d = haversine_distance(12.9716, 77.5946, s.lat, s.lng);
                d > 5.0 && d <= 10.0
            })
            .collect();

        assert_eq!(result.neighbors.len(), brute.len());
    }

    #[test]
    fn test_unlocatable_candidates_dropped_and_counted() {
        let engine = NeighborEngine::with_default_tiers();

        let mut bad = create_site("TR-9999", f64::NAN, 77.5946);
        bad.status = SiteStatus::Alert;
        let candidates = vec![create_site("TR-1001", 12.9750, 77.5990), bad];

        for tier in engine.tiers().to_vec() {
            let result = engine.find_neighbors(&reference(), candidates.clone(), &tier);
            assert!(result.neighbors.iter().all(|n| n.id != "TR-9999"));
            assert_eq!(result.unlocatable, 1);
        }
    }

    #[test]
    fn test_empty_population() {
        let engine = NeighborEngine::with_default_tiers();
        let tier = engine.tier(0).copied().unwrap();

        let result = engine.find_neighbors(&reference(), vec![], &tier);

        assert!(result.neighbors.is_empty());
        assert_eq!(result.total_candidates, 0);
        assert_eq!(result.unlocatable, 0);
    }

    #[test]
    fn test_tier_counts_partition_population() {
        let engine = NeighborEngine::with_default_tiers();

        let candidates: Vec<Site> = (0..30)
            .map(|i| {
                create_site(
                    &format!("TR-{:04}", 1001 + i),
                    12.9716 + f64::from(i) * 0.01,
                    77.5946,
                )
            })
            .collect();

        let counts = engine.tier_counts(&reference(), &candidates);

        assert_eq!(counts.len(), 3);
        assert_eq!(counts.iter().sum::<usize>(), candidates.len());
    }

    #[test]
    fn test_status_passed_through_unchanged() {
        let engine = NeighborEngine::with_default_tiers();
        let tier = engine.tier(0).copied().unwrap();

        let mut site = create_site("TR-1001", 12.9750, 77.5990);
        site.status = SiteStatus::Alert;

        let result = engine.find_neighbors(&reference(), vec![site], &tier);

        assert_eq!(result.neighbors[0].status, SiteStatus::Alert);
    }
}
