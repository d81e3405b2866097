//! Reference Directory - postal code → coordinates and region labels
//!
//! Loaded once at startup and read-only afterwards. The directory is an
//! ordinary value handed to the query engine (no process-wide global), so tests
//! can build one in memory with [`ReferenceDirectory::from_locations`].
//!
//! # Architecture
//!
//! ```text
//! uszips.csv → loader (header alias mapping) → ReferenceDirectory
//!     ↓                                            ↓
//! GeoFilter (haversine radius)             filter_by_region (city/state)
//! ```

pub mod geo;
pub mod loader;

pub use geo::{
    distance_miles, validate_radius, GeoFilter, DEFAULT_RADIUS_MILES, EARTH_RADIUS_MILES,
};

use crate::error::QueryError;
use crate::postal::PostalCode;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One row of the reference table
#[derive(Debug, Clone, PartialEq)]
pub struct PostalLocation {
    pub code: PostalCode,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
}

/// Which label a region query matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    City,
    State,
}

impl RegionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::City => "city",
            RegionKind::State => "state",
        }
    }

    /// Capitalized label for user-facing messages
    pub fn title(&self) -> &'static str {
        match self {
            RegionKind::City => "City",
            RegionKind::State => "State",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "city" => Ok(RegionKind::City),
            "state" => Ok(RegionKind::State),
            other => Err(QueryError::InvalidInput(format!(
                "region type must be 'city' or 'state', got '{}'",
                other
            ))),
        }
    }
}

/// In-memory postal code reference table
#[derive(Debug, Default)]
pub struct ReferenceDirectory {
    locations: BTreeMap<PostalCode, PostalLocation>,
}

impl ReferenceDirectory {
    /// Load the directory from a CSV file (see [`loader`] for accepted headers)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        loader::load_csv(path)
    }

    /// Build a directory from already-parsed locations
    ///
    /// Duplicate codes keep the first location seen.
    pub fn from_locations(locations: impl IntoIterator<Item = PostalLocation>) -> Self {
        let mut map = BTreeMap::new();
        for location in locations {
            map.entry(location.code.clone()).or_insert(location);
        }
        Self { locations: map }
    }

    pub fn lookup(&self, code: &PostalCode) -> Result<&PostalLocation, QueryError> {
        self.locations
            .get(code)
            .ok_or_else(|| QueryError::NotFound(code.to_string()))
    }

    pub fn contains(&self, code: &PostalCode) -> bool {
        self.locations.contains_key(code)
    }

    /// Codes whose city or state label equals `value`, ignoring case and
    /// surrounding whitespace. Empty when nothing matches.
    pub fn filter_by_region(&self, kind: RegionKind, value: &str) -> BTreeSet<PostalCode> {
        let wanted = value.trim().to_lowercase();
        if wanted.is_empty() {
            return BTreeSet::new();
        }

        self.locations
            .values()
            .filter(|location| {
                let label = match kind {
                    RegionKind::City => &location.city,
                    RegionKind::State => &location.state,
                };
                label.trim().to_lowercase() == wanted
            })
            .map(|location| location.code.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostalLocation> {
        self.locations.values()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
