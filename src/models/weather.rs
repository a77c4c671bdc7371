//! Weather data models and display methods

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current conditions at a location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Title-cased description, e.g. "Light Rain"
    pub description: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: Option<u8>,
    /// Wind speed in km/h, rounded to one decimal
    pub wind_kph: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: Option<u16>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// `None` when the air pollution endpoint could not be reached
    pub air_quality: Option<AirQuality>,
}

impl CurrentConditions {
    /// Convert wind speed from m/s to km/h rounded to one decimal
    #[must_use]
    pub fn ms_to_kph(speed_ms: f64) -> f64 {
        (speed_ms * 3.6 * 10.0).round() / 10.0
    }

    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        match self.wind_direction {
            Some(degrees) => format!(
                "{:.1} km/h {}",
                self.wind_kph,
                Self::wind_direction_to_cardinal(degrees)
            ),
            None => format!("{:.1} km/h", self.wind_kph),
        }
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        self.humidity
            .map_or_else(|| "--".to_string(), |h| format!("{h}%"))
    }
}

/// Air quality index and pollutant concentrations
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQuality {
    /// OpenWeather AQI, 1 (good) to 5 (very poor)
    pub index: u8,
    /// Pollutant concentrations in μg/m³ keyed by component name (co, no2, pm2_5, ...)
    pub components: BTreeMap<String, f64>,
}

impl AirQuality {
    /// Components ordered by concentration, highest first
    #[must_use]
    pub fn components_by_concentration(&self) -> Vec<(&str, f64)> {
        let mut components: Vec<(&str, f64)> = self
            .components
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        components.sort_by(|a, b| b.1.total_cmp(&a.1));
        components
    }
}

/// One 3-hour step of the provider forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    pub time: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    pub description: String,
}

/// One day of the daily temperature outlook
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    /// Temperature in Celsius
    pub temperature: f64,
}

impl From<&ForecastEntry> for DailyTemperature {
    fn from(entry: &ForecastEntry) -> Self {
        Self {
            date: entry.time.date(),
            temperature: entry.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn conditions() -> CurrentConditions {
        CurrentConditions {
            description: "Haze".to_string(),
            temperature: 32.04,
            humidity: Some(48),
            wind_kph: 13.0,
            wind_direction: Some(290),
            sunrise: None,
            sunset: None,
            air_quality: None,
        }
    }

    #[rstest]
    #[case(3.6, 13.0)]
    #[case(0.0, 0.0)]
    #[case(2.57, 9.3)]
    fn test_ms_to_kph(#[case] ms: f64, #[case] kph: f64) {
        assert_eq!(CurrentConditions::ms_to_kph(ms), kph);
    }

    #[rstest]
    #[case(0, "N")]
    #[case(90, "E")]
    #[case(200, "SSW")]
    #[case(360, "N")]
    #[case(400, "Unknown")]
    fn test_wind_direction_to_cardinal(#[case] degrees: u16, #[case] cardinal: &str) {
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(degrees), cardinal);
    }

    #[test]
    fn test_formatting() {
        let current = conditions();
        assert_eq!(current.format_temperature(), "32.0°C");
        assert_eq!(current.format_wind(), "13.0 km/h WNW");
        assert_eq!(current.format_humidity(), "48%");

        let calm = CurrentConditions {
            wind_direction: None,
            humidity: None,
            ..conditions()
        };
        assert_eq!(calm.format_wind(), "13.0 km/h");
        assert_eq!(calm.format_humidity(), "--");
    }

    #[test]
    fn test_components_by_concentration() {
        let air = AirQuality {
            index: 4,
            components: BTreeMap::from([
                ("co".to_string(), 1201.6),
                ("no2".to_string(), 40.1),
                ("pm2_5".to_string(), 95.3),
            ]),
        };
        let ordered: Vec<&str> = air
            .components_by_concentration()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(ordered, vec!["co", "pm2_5", "no2"]);
    }
}
