use crate::models::RadiusTier;
use std::fmt;
use thiserror::Error;

/// Errors in a caller-supplied tier boundary list
#[derive(Debug, Error, PartialEq)]
pub enum TierError {
    #[error("at least one tier boundary is required")]
    Empty,

    #[error("tier boundary must be a positive finite number, got {0}")]
    InvalidBoundary(f64),

    #[error("tier boundaries must be strictly increasing, got {0} then {1}")]
    NotIncreasing(f64, f64),
}

/// Build the radius tier set from an ordered list of boundaries in km.
///
/// `N` boundaries produce `N + 1` mutually exclusive, collectively
/// exhaustive bands: `[0, b1]`, `(b1, b2]`, ..., `(bN, inf)`.
pub fn build_tiers(boundaries_km: &[f64]) -> Result<Vec<RadiusTier>, TierError> {
    if boundaries_km.is_empty() {
        return Err(TierError::Empty);
    }

    let mut tiers = Vec::with_capacity(boundaries_km.len() + 1);
    let mut prev = 0.0;

    for &boundary in boundaries_km {
        if !boundary.is_finite() || boundary <= 0.0 {
            return Err(TierError::InvalidBoundary(boundary));
        }
        if boundary <= prev {
            return Err(TierError::NotIncreasing(prev, boundary));
        }
        tiers.push(RadiusTier {
            min_km: prev,
            max_km: Some(boundary),
        });
        prev = boundary;
    }

    // Open-ended tail so the set covers every finite distance
    tiers.push(RadiusTier {
        min_km: prev,
        max_km: None,
    });

    Ok(tiers)
}

impl RadiusTier {
    /// Interval membership test.
    ///
    /// The lower bound is exclusive except at 0, so a zero distance lands in
    /// the first band of a set. NaN fails every tier.
    #[inline]
    pub fn contains(&self, distance_km: f64) -> bool {
        let above_min = if self.min_km <= 0.0 {
            distance_km >= 0.0
        } else {
            distance_km > self.min_km
        };
        let below_max = match self.max_km {
            Some(max) => distance_km <= max,
            None => distance_km.is_finite(),
        };
        above_min && below_max
    }

    /// Filename-safe form of the label, used in export attachment names
    pub fn slug(&self) -> String {
        match self.max_km {
            Some(max) if self.min_km <= 0.0 => format!("{}km", max),
            Some(max) => format!("{}-{}km", self.min_km, max),
            None => format!("over-{}km", self.min_km),
        }
    }
}

impl fmt::Display for RadiusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_km {
            Some(max) if self.min_km <= 0.0 => write!(f, "<={}km", max),
            Some(max) => write!(f, "{}-{}km", self.min_km, max),
            None => write!(f, ">{}km", self.min_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_tiers() {
        let tiers = build_tiers(&[5.0, 10.0]).unwrap();

        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0], RadiusTier { min_km: 0.0, max_km: Some(5.0) });
        assert_eq!(tiers[1], RadiusTier { min_km: 5.0, max_km: Some(10.0) });
        assert_eq!(tiers[2], RadiusTier { min_km: 10.0, max_km: None });
    }

    #[test]
    fn test_build_rejects_bad_boundaries() {
        assert_eq!(build_tiers(&[]), Err(TierError::Empty));
        assert_eq!(build_tiers(&[-1.0]), Err(TierError::InvalidBoundary(-1.0)));
        assert_eq!(build_tiers(&[0.0]), Err(TierError::InvalidBoundary(0.0)));
        assert!(build_tiers(&[f64::NAN]).is_err());
        assert_eq!(
            build_tiers(&[10.0, 5.0]),
            Err(TierError::NotIncreasing(10.0, 5.0))
        );
        assert_eq!(
            build_tiers(&[5.0, 5.0]),
            Err(TierError::NotIncreasing(5.0, 5.0))
        );
    }

    #[test]
    fn test_first_tier_includes_zero() {
        let tiers = build_tiers(&[5.0, 10.0]).unwrap();

        assert!(tiers[0].contains(0.0));
        assert!(tiers[0].contains(5.0));
        assert!(!tiers[0].contains(5.0001));
        assert!(!tiers[1].contains(0.0));
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let tiers = build_tiers(&[5.0, 10.0]).unwrap();

        // 5.0 belongs to the first band only, 10.0 to the second only
        assert!(tiers[0].contains(5.0) && !tiers[1].contains(5.0));
        assert!(tiers[1].contains(10.0) && !tiers[2].contains(10.0));
        assert!(tiers[2].contains(10.0001));
    }

    #[test]
    fn test_nan_fails_every_tier() {
        let tiers = build_tiers(&[5.0, 10.0]).unwrap();
        for tier in &tiers {
            assert!(!tier.contains(f64::NAN));
        }
    }

    #[test]
    fn test_infinite_distance_fails_open_tail() {
        let tiers = build_tiers(&[5.0]).unwrap();
        assert!(!tiers[1].contains(f64::INFINITY));
    }

    #[test]
    fn test_labels_and_slugs() {
        let tiers = build_tiers(&[5.0, 10.0]).unwrap();

        assert_eq!(tiers[0].to_string(), "<=5km");
        assert_eq!(tiers[1].to_string(), "5-10km");
        assert_eq!(tiers[2].to_string(), ">10km");

        assert_eq!(tiers[0].slug(), "5km");
        assert_eq!(tiers[1].slug(), "5-10km");
        assert_eq!(tiers[2].slug(), "over-10km");
    }
}
