//! `WeatherWise` - weather dashboard backend
//!
//! This library provides the weather provider client, the city dataset and
//! the nearby-city selector that picks spaced-out neighbouring cities around
//! a location, plus the report assembly used by the CLI.

pub mod config;
pub mod dataset;
pub mod display;
pub mod error;
pub mod geo;
pub mod logging;
pub mod models;
pub mod nearby;
pub mod report;
pub mod weather;

// Re-export core types for public API
pub use config::WeatherWiseConfig;
pub use dataset::CityTable;
pub use error::WeatherWiseError;
pub use models::{CityRecord, Coordinate, NearbyCity};
pub use nearby::{NearbySelector, SelectionParams, TemperatureLookup};
pub use report::{ReportService, WeatherReport};
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherWiseError>;
