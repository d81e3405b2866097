//! CSV loader for the reference directory
//!
//! Reference files come from several sources (Kaggle `uszips.csv`, pgeocode
//! dumps, hand-built extracts) with different header spellings. Headers are
//! matched against an explicit alias table; the code and coordinate columns
//! are mandatory, the city/state labels are optional.

use super::{PostalLocation, ReferenceDirectory};
use crate::error::QueryError;
use crate::postal::PostalCode;
use std::io::Read;
use std::path::Path;

const CODE_ALIASES: &[&str] = &["zip", "postal code", "postal_code", "zipcode"];
const LATITUDE_ALIASES: &[&str] = &["lat", "latitude"];
const LONGITUDE_ALIASES: &[&str] = &["lng", "lon", "longitude"];
const CITY_ALIASES: &[&str] = &["city", "place name"];
const STATE_ALIASES: &[&str] = &["state", "admin name1", "state_name"];

/// Resolved column positions for one file
#[derive(Debug)]
struct ColumnMap {
    code: usize,
    latitude: usize,
    longitude: usize,
    city: Option<usize>,
    state: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, QueryError> {
        let find = |aliases: &[&str]| {
            headers.iter().position(|header| {
                let header = header.trim().to_lowercase();
                aliases.iter().any(|alias| *alias == header)
            })
        };
        let require = |name: &str, aliases: &[&str]| {
            find(aliases).ok_or_else(|| {
                QueryError::Reference(format!(
                    "missing {} column (expected one of: {})",
                    name,
                    aliases.join(", ")
                ))
            })
        };

        Ok(Self {
            code: require("postal code", CODE_ALIASES)?,
            latitude: require("latitude", LATITUDE_ALIASES)?,
            longitude: require("longitude", LONGITUDE_ALIASES)?,
            city: find(CITY_ALIASES),
            state: find(STATE_ALIASES),
        })
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Option<PostalLocation> {
        let code = PostalCode::parse(record.get(self.code)?).ok()?;
        let latitude: f64 = record.get(self.latitude)?.trim().parse().ok()?;
        let longitude: f64 = record.get(self.longitude)?.trim().parse().ok()?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }

        let label = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        Some(PostalLocation {
            code,
            latitude,
            longitude,
            city: label(self.city),
            state: label(self.state),
        })
    }
}

/// Load a reference directory from a CSV file on disk
pub fn load_csv(path: impl AsRef<Path>) -> Result<ReferenceDirectory, QueryError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        QueryError::Reference(format!("cannot open {}: {}", path.display(), e))
    })?;
    let directory = load_from_reader(file)?;

    log::info!(
        "📂 Loaded {} ZIP codes from {}",
        directory.len(),
        path.display()
    );
    Ok(directory)
}

/// Load a reference directory from any CSV source
pub fn load_from_reader(reader: impl Read) -> Result<ReferenceDirectory, QueryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;
    if columns.city.is_none() || columns.state.is_none() {
        log::warn!(
            "⚠️  Reference file has no city/state labels; region queries will match nothing"
        );
    }

    let mut locations = Vec::new();
    let mut skipped = 0usize;
    for record in csv_reader.records() {
        match columns.parse_row(&record?) {
            Some(location) => locations.push(location),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!(
            "⚠️  Skipped {} reference rows with malformed ZIP or coordinates",
            skipped
        );
    }

    Ok(ReferenceDirectory::from_locations(locations))
}
