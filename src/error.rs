//! Errors surfaced by `WeatherWise`
//!
//! Lookups that may legitimately come back empty (nearby temperatures, air
//! quality, a missing dataset) are `Option`s or empty collections, not errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherWiseError {
    /// Settings that cannot work: bad ranges, unknown timezone, client setup
    #[error("configuration: {message}")]
    Config { message: String },

    /// The weather provider was unreachable, refused the request or sent a
    /// body we could not read. `status` is set when an HTTP response arrived.
    #[error("weather provider: {message}")]
    Api { message: String, status: Option<u16> },

    /// Caller-supplied values out of range
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// The city table could not be read
    #[error("city dataset: {message}")]
    Dataset { message: String },
}

impl WeatherWiseError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Transport or decoding failure without an HTTP status
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Non-success HTTP response from the provider
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// One line fit for the terminal, without provider internals
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message } => format!("Check your WeatherWise settings: {message}"),
            Self::Api {
                status: Some(401), ..
            } => "The weather provider rejected the API key. Set OPENWEATHER_API_KEY or weather.api_key."
                .to_string(),
            Self::Api {
                status: Some(429), ..
            } => "The weather provider's rate limit was hit. Try again in a minute.".to_string(),
            Self::Api { .. } => {
                "Weather data could not be retrieved. Check your internet connection.".to_string()
            }
            Self::Validation { message } => format!("Invalid input: {message}"),
            Self::Dataset { .. } => {
                "The city dataset could not be read, so nearby cities are unavailable.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for WeatherWiseError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs carry the API key
        let status = err.status().map(|s| s.as_u16());
        let message = err.without_url().to_string();
        Self::Api { message, status }
    }
}
