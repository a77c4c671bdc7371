//! City dataset loading
//!
//! The city table is read once from a `worldcities.csv`-style file, filtered
//! to a single country and shared read-only between queries. A table that
//! cannot be loaded is empty: "no nearby cities" is a valid state for the
//! dashboard, not a failure.

use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::config::DatasetConfig;
use crate::error::WeatherWiseError;
use crate::models::{CityRecord, Coordinate};

static SHARED_TABLE: OnceLock<Arc<CityTable>> = OnceLock::new();

/// Row layout of the dataset; extra columns are ignored
#[derive(Debug, Deserialize)]
struct CityRow {
    #[serde(rename = "city")]
    name: String,
    country: String,
    #[serde(rename = "lat", alias = "latitude")]
    latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    longitude: f64,
}

/// In-memory, read-only table of cities for one country
#[derive(Debug, Default, Clone)]
pub struct CityTable {
    cities: Vec<CityRecord>,
}

impl CityTable {
    /// Build a table from records already in memory
    #[must_use]
    pub fn from_records(cities: Vec<CityRecord>) -> Self {
        Self { cities }
    }

    /// Load the cities of `country` from a CSV file.
    ///
    /// Any failure (missing file, unreadable file, malformed row) is logged
    /// and yields an empty table.
    #[must_use]
    pub fn load(path: impl AsRef<Path>, country: &str) -> Self {
        let path = path.as_ref();
        match Self::try_load(path, country) {
            Ok(table) => {
                info!(
                    "Loaded {} cities for {} from {}",
                    table.len(),
                    country,
                    path.display()
                );
                table
            }
            Err(e) => {
                warn!("City dataset unavailable, nearby cities disabled: {}", e);
                Self::default()
            }
        }
    }

    /// Load the cities of `country` from a CSV file, surfacing the failure
    pub fn try_load(path: impl AsRef<Path>, country: &str) -> crate::Result<Self> {
        let path = path.as_ref();
        debug!("Reading city dataset from {}", path.display());

        let reader = csv::Reader::from_path(path).map_err(|e| {
            WeatherWiseError::dataset(format!("cannot open {}: {e}", path.display()))
        })?;
        Self::from_csv_reader(reader, country)
    }

    /// Parse a dataset from any reader, e.g. an in-memory fixture
    pub fn from_reader<R: std::io::Read>(reader: R, country: &str) -> crate::Result<Self> {
        Self::from_csv_reader(csv::Reader::from_reader(reader), country)
    }

    fn from_csv_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        country: &str,
    ) -> crate::Result<Self> {
        let mut cities = Vec::new();
        for (index, row) in reader.deserialize::<CityRow>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let row = row.map_err(|e| {
                WeatherWiseError::dataset(format!("malformed row at line {line}: {e}"))
            })?;
            let coordinate = Coordinate::new(row.latitude, row.longitude).map_err(|e| {
                WeatherWiseError::dataset(format!("bad coordinate at line {line}: {e}"))
            })?;
            if row.country.trim().eq_ignore_ascii_case(country.trim()) {
                cities.push(CityRecord::new(row.name, row.country, coordinate));
            }
        }
        Ok(Self { cities })
    }

    #[must_use]
    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Process-wide city table, loaded on first use.
///
/// Later calls return the table from the first call regardless of `config`.
pub fn shared(config: &DatasetConfig) -> Arc<CityTable> {
    SHARED_TABLE
        .get_or_init(|| Arc::new(CityTable::load(&config.path, &config.country)))
        .clone()
}
