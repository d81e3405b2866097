//! Radius search over the reference directory
//!
//! Distances are great-circle distances on a sphere (haversine) using the mean
//! Earth radius. Against the WGS-84 ellipsoid the error stays under ~0.5%,
//! which is well inside the granularity of a 20 mile radius search.

use super::{PostalLocation, ReferenceDirectory};
use crate::error::QueryError;
use crate::postal::PostalCode;
use std::collections::BTreeSet;

/// Mean Earth radius (IUGG) in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// Radius used when the caller does not supply one
pub const DEFAULT_RADIUS_MILES: f64 = 20.0;

/// Great-circle distance between two locations in miles
pub fn distance_miles(a: &PostalLocation, b: &PostalLocation) -> f64 {
    haversine_miles(a.latitude, a.longitude, b.latitude, b.longitude)
}

fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1.0 for antipodal points
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Reject radii that would make the search meaningless
pub fn validate_radius(radius_miles: f64) -> Result<f64, QueryError> {
    if radius_miles.is_finite() && radius_miles > 0.0 {
        Ok(radius_miles)
    } else {
        Err(QueryError::InvalidInput(format!(
            "radius must be a positive number of miles, got {}",
            radius_miles
        )))
    }
}

pub struct GeoFilter<'a> {
    directory: &'a ReferenceDirectory,
}

impl<'a> GeoFilter<'a> {
    pub fn new(directory: &'a ReferenceDirectory) -> Self {
        Self { directory }
    }

    /// Codes within `radius_miles` of `center`, the center itself included
    ///
    /// # Errors
    /// - `InvalidInput` when the radius is not a positive finite number
    /// - `NotFound` when the center is not in the directory
    pub fn nearby(
        &self,
        center: &PostalCode,
        radius_miles: f64,
    ) -> Result<BTreeSet<PostalCode>, QueryError> {
        let radius_miles = validate_radius(radius_miles)?;
        let origin = self.directory.lookup(center)?;

        let codes: BTreeSet<PostalCode> = self
            .directory
            .iter()
            .filter(|candidate| distance_miles(origin, candidate) <= radius_miles)
            .map(|candidate| candidate.code.clone())
            .collect();

        log::debug!(
            "📍 {} ZIPs within {} mi of {} (of {} in directory)",
            codes.len(),
            radius_miles,
            center,
            self.directory.len()
        );

        Ok(codes)
    }
}
