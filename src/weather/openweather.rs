//! `OpenWeather` API response structures and conversion utilities

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{AirQuality, CurrentConditions, ForecastEntry};

const FORECAST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Entry of the direct geocoding response
#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct SunTimes {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// Current weather response (`/data/2.5/weather`)
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    pub wind: Option<Wind>,
    pub sys: Option<SunTimes>,
}

#[derive(Debug, Deserialize)]
pub struct AqiMain {
    pub aqi: u8,
}

#[derive(Debug, Deserialize)]
pub struct PollutionSample {
    pub main: AqiMain,
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
}

/// Air pollution response (`/data/2.5/air_pollution`)
#[derive(Debug, Deserialize)]
pub struct PollutionResponse {
    #[serde(default)]
    pub list: Vec<PollutionSample>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt_txt: String,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

/// 5 day / 3 hour forecast response (`/data/2.5/forecast`)
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

/// Upper-case the first letter of every word: "light rain" -> "Light Rain"
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn first_description(conditions: &[Condition]) -> String {
    conditions
        .first()
        .map_or_else(|| "Unknown".to_string(), |c| title_case(&c.description))
}

impl CurrentResponse {
    /// Convert to the internal model; air quality is fetched separately
    #[must_use]
    pub fn into_conditions(self, air_quality: Option<AirQuality>) -> CurrentConditions {
        let (sunrise, sunset) = self
            .sys
            .map(|sys| (sys.sunrise.and_then(from_unix), sys.sunset.and_then(from_unix)))
            .unwrap_or_default();

        CurrentConditions {
            description: first_description(&self.weather),
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_kph: self
                .wind
                .as_ref()
                .map_or(0.0, |wind| CurrentConditions::ms_to_kph(wind.speed)),
            wind_direction: self.wind.and_then(|wind| wind.deg),
            sunrise,
            sunset,
            air_quality,
        }
    }
}

impl PollutionResponse {
    /// Latest sample, `None` when the list is empty
    #[must_use]
    pub fn into_air_quality(self) -> Option<AirQuality> {
        self.list.into_iter().next().map(|sample| AirQuality {
            index: sample.main.aqi,
            components: sample.components,
        })
    }
}

impl ForecastResponse {
    /// Forecast steps in provider order; steps with an unreadable time are skipped
    #[must_use]
    pub fn into_entries(self) -> Vec<ForecastEntry> {
        self.list
            .into_iter()
            .filter_map(|item| {
                match NaiveDateTime::parse_from_str(&item.dt_txt, FORECAST_TIME_FORMAT) {
                    Ok(time) => Some(ForecastEntry {
                        time,
                        temperature: item.main.temp,
                        description: first_description(&item.weather),
                    }),
                    Err(e) => {
                        debug!("Skipping forecast step '{}': {}", item.dt_txt, e);
                        None
                    }
                }
            })
            .collect()
    }
}

fn from_unix(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}
