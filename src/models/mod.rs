//! Data models for the WeatherWise application
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates, dataset cities and nearby-city candidates
//! - Weather: current conditions, air quality and forecasts

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{CityRecord, Coordinate, NearbyCity};
pub use weather::{AirQuality, CurrentConditions, DailyTemperature, ForecastEntry};
