//! Weather report assembly
//!
//! Collects everything the dashboard shows for one city. Only geocoding and
//! current conditions are required; nearby cities and forecasts degrade to
//! empty sections.

use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::WeatherWiseConfig;
use crate::dataset::{self, CityTable};
use crate::display;
use crate::error::WeatherWiseError;
use crate::models::{Coordinate, CurrentConditions, DailyTemperature, ForecastEntry, NearbyCity};
use crate::nearby::NearbySelector;
use crate::weather::{self, WeatherClient};
use crate::Result;

/// Everything shown for one city
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub coordinate: Coordinate,
    pub current: CurrentConditions,
    pub icon: &'static str,
    pub tip: &'static str,
    pub nearby: Vec<NearbyCity>,
    pub hourly: Vec<ForecastEntry>,
    pub daily: Vec<DailyTemperature>,
    #[serde(skip)]
    pub timezone: Tz,
}

/// Builds [`WeatherReport`]s from the weather provider and the city table
pub struct ReportService {
    client: WeatherClient,
    selector: NearbySelector<WeatherClient>,
    display_limit: usize,
    timezone: Tz,
}

impl ReportService {
    /// Service backed by the process-wide city table
    pub fn new(config: &WeatherWiseConfig) -> Result<Self> {
        Self::with_table(config, dataset::shared(&config.dataset))
    }

    /// Service backed by an explicit city table
    pub fn with_table(config: &WeatherWiseConfig, table: Arc<CityTable>) -> Result<Self> {
        let client = WeatherClient::new(&config.weather)?;
        let selector = selector_for(config, table, client.clone())?;
        let timezone = config
            .display
            .timezone
            .parse::<Tz>()
            .map_err(|_| WeatherWiseError::config(format!("Unknown timezone '{}'", config.display.timezone)))?;

        Ok(Self {
            client,
            selector,
            display_limit: config.nearby.display_limit as usize,
            timezone,
        })
    }

    #[must_use]
    pub fn selector(&self) -> &NearbySelector<WeatherClient> {
        &self.selector
    }

    /// Build the full report for `city`
    #[tracing::instrument(name = "build_report", skip(self))]
    pub async fn build(&self, city: &str) -> Result<WeatherReport> {
        let coordinate = self
            .client
            .geocode(city)
            .await?
            .ok_or_else(|| WeatherWiseError::validation(format!("City not found: {}", city.trim())))?;

        let current = self.client.current_conditions(coordinate).await?;

        let mut nearby = self.selector.select_nearby(coordinate).await;
        nearby.truncate(self.display_limit);

        let (hourly, daily) = match self.client.forecast(coordinate).await {
            Ok(entries) => (weather::hourly_steps(&entries), weather::daily_samples(&entries)),
            Err(e) => {
                warn!("Forecast unavailable for {}: {}", city, e);
                (Vec::new(), Vec::new())
            }
        };

        info!(
            "Report for {} ready: {} nearby cities, {} forecast days",
            city,
            nearby.len(),
            daily.len()
        );

        Ok(WeatherReport {
            city: city.trim().to_string(),
            coordinate,
            icon: display::weather_icon(&current.description),
            tip: display::weather_tip(&current.description),
            current,
            nearby,
            hourly,
            daily,
            timezone: self.timezone,
        })
    }
}

/// Nearby selector configured from `config`
pub fn selector_for<L: crate::nearby::TemperatureLookup>(
    config: &WeatherWiseConfig,
    table: Arc<CityTable>,
    lookup: L,
) -> Result<NearbySelector<L>> {
    let params = config.nearby.selection_params();
    params.validate()?;
    Ok(NearbySelector::new(table, lookup)
        .with_params(params)
        .with_lookup_timeout(config.weather.lookup_timeout())
        .with_max_concurrent_lookups(config.weather.max_concurrent_lookups as usize))
}

/// Print nearby cities as an aligned table
pub fn write_nearby(f: &mut impl fmt::Write, nearby: &[NearbyCity]) -> fmt::Result {
    if nearby.is_empty() {
        return writeln!(f, "  No nearby cities found.");
    }
    for city in nearby {
        writeln!(
            f,
            "  {:<20} {:>7.1} km  {:>8}",
            city.name,
            city.distance_km,
            city.format_temperature()
        )?;
    }
    Ok(())
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = &self.current;
        writeln!(
            f,
            "{} Weather in {}: {}, {}",
            self.icon,
            self.city,
            current.description,
            current.format_temperature()
        )?;
        writeln!(f, "Tip: {}", self.tip)?;
        writeln!(f)?;

        writeln!(f, "Highlights")?;
        writeln!(f, "  Humidity  {}", current.format_humidity())?;
        writeln!(f, "  Wind      {}", current.format_wind())?;
        writeln!(
            f,
            "  Driving   {}",
            display::driving_conditions(current.wind_kph)
        )?;
        writeln!(
            f,
            "  Sunrise   {}",
            display::format_optional_time(current.sunrise, self.timezone)
        )?;
        writeln!(
            f,
            "  Sunset    {}",
            display::format_optional_time(current.sunset, self.timezone)
        )?;
        match &current.air_quality {
            Some(air) => {
                writeln!(
                    f,
                    "  AQI       {} ({})",
                    air.index,
                    display::air_quality_label(air.index)
                )?;
                writeln!(f)?;
                writeln!(f, "Gas components (μg/m³)")?;
                for (name, value) in air.components_by_concentration() {
                    writeln!(f, "  {name:<8} {value:>9.2}")?;
                }
            }
            None => writeln!(f, "  AQI       --")?,
        }
        writeln!(f)?;

        writeln!(f, "Nearby cities")?;
        write_nearby(f, &self.nearby)?;
        writeln!(f)?;

        writeln!(f, "Hourly forecast")?;
        if self.hourly.is_empty() {
            writeln!(f, "  Hourly forecast not available.")?;
        }
        for entry in &self.hourly {
            writeln!(
                f,
                "  {}  {:>6.1}°C  {}",
                entry.time.format("%Y-%m-%d %H:%M"),
                entry.temperature,
                entry.description
            )?;
        }
        writeln!(f)?;

        writeln!(f, "{}-day temperature forecast", self.daily.len())?;
        if self.daily.is_empty() {
            writeln!(f, "  Forecast data not available.")?;
        }
        for day in &self.daily {
            writeln!(f, "  {}  {:>6.1}°C", day.date, day.temperature)?;
        }
        Ok(())
    }
}
