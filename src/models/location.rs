//! Coordinate and city records

use serde::Serialize;

use crate::error::WeatherWiseError;

/// Geographic coordinate in decimal degrees.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180];
/// [`Coordinate::new`] rejects anything else instead of clamping.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    pub fn new(latitude: f64, longitude: f64) -> crate::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherWiseError::validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherWiseError::validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A named city from the static dataset
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CityRecord {
    pub name: String,
    pub country: String,
    pub coordinate: Coordinate,
}

impl CityRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, country: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            coordinate,
        }
    }
}

/// A city considered for the nearby list, annotated with its distance from
/// the query point and the temperature observed there, if any.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NearbyCity {
    pub name: String,
    pub coordinate: Coordinate,
    /// Great-circle distance from the query coordinate
    pub distance_km: f64,
    /// `None` when the weather lookup failed, timed out or was not attempted
    pub temperature_celsius: Option<f64>,
}

impl NearbyCity {
    #[must_use]
    pub fn new(city: &CityRecord, distance_km: f64) -> Self {
        Self {
            name: city.name.clone(),
            coordinate: city.coordinate,
            distance_km,
            temperature_celsius: None,
        }
    }

    /// Format the temperature for display, `--` when unknown
    #[must_use]
    pub fn format_temperature(&self) -> String {
        self.temperature_celsius
            .map_or_else(|| "--".to_string(), |t| format!("{t:.1}°C"))
    }
}
