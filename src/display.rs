//! Text helpers for presenting weather data

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Icon for a condition description, matched on keywords
#[must_use]
pub fn weather_icon(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    if condition.contains("sun") || condition.contains("clear") {
        "☀️"
    } else if condition.contains("cloud") {
        "☁️"
    } else if condition.contains("rain") {
        "🌧️"
    } else if condition.contains("storm") {
        "⛈️"
    } else if condition.contains("mist") || condition.contains("fog") {
        "🌫️"
    } else {
        "🌡️"
    }
}

/// One-line advice for the day's conditions
#[must_use]
pub fn weather_tip(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    if condition.contains("rain") {
        "Don't forget your umbrella today!"
    } else if condition.contains("sun") || condition.contains("clear") {
        "Wear sunglasses and drink water!"
    } else if condition.contains("cloud") {
        "A calm day! Perfect for a walk!"
    } else if condition.contains("storm") {
        "Stay indoors and avoid travel!"
    } else if condition.contains("fog") || condition.contains("mist") {
        "Drive carefully, visibility is low."
    } else {
        "Stay safe and check the forecast before heading out!"
    }
}

/// Wind above this speed makes driving risky
const RISKY_WIND_KPH: f64 = 30.0;

/// Driving advisory from wind speed in km/h
#[must_use]
pub fn driving_conditions(wind_kph: f64) -> &'static str {
    if wind_kph > RISKY_WIND_KPH {
        "Risky ⚠️"
    } else {
        "Clear ✅"
    }
}

/// Label for the 1-5 air quality index
#[must_use]
pub fn air_quality_label(index: u8) -> &'static str {
    match index {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}

/// Wall-clock time such as "06:12 AM" in `timezone`
#[must_use]
pub fn format_local_time(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant.with_timezone(&timezone).format("%I:%M %p").to_string()
}

/// Like [`format_local_time`], `--` when the instant is unknown
#[must_use]
pub fn format_optional_time(instant: Option<DateTime<Utc>>, timezone: Tz) -> String {
    instant.map_or_else(|| "--".to_string(), |t| format_local_time(t, timezone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Clear Sky", "☀️")]
    #[case("Sunny", "☀️")]
    #[case("Broken Clouds", "☁️")]
    #[case("Light Rain", "🌧️")]
    #[case("Thunderstorm", "⛈️")]
    #[case("Mist", "🌫️")]
    #[case("Haze", "🌡️")]
    fn test_weather_icon(#[case] condition: &str, #[case] icon: &str) {
        assert_eq!(weather_icon(condition), icon);
    }

    #[test]
    fn test_rain_tip_wins_over_clouds() {
        // "rain" is checked before "cloud" for tips, after it for icons
        assert_eq!(weather_tip("rain and clouds"), "Don't forget your umbrella today!");
        assert_eq!(weather_icon("rain and clouds"), "☁️");
    }

    #[rstest]
    #[case("Thunderstorm With Rain", "Don't forget your umbrella today!")]
    #[case("Thunderstorm", "Stay indoors and avoid travel!")]
    #[case("Fog", "Drive carefully, visibility is low.")]
    #[case("Smoke", "Stay safe and check the forecast before heading out!")]
    fn test_weather_tip(#[case] condition: &str, #[case] tip: &str) {
        assert_eq!(weather_tip(condition), tip);
    }

    #[rstest]
    #[case(0.0, "Clear ✅")]
    #[case(30.0, "Clear ✅")]
    #[case(30.1, "Risky ⚠️")]
    #[case(72.5, "Risky ⚠️")]
    fn test_driving_conditions(#[case] wind_kph: f64, #[case] expected: &str) {
        assert_eq!(driving_conditions(wind_kph), expected);
    }

    #[rstest]
    #[case(1, "Good")]
    #[case(5, "Very Poor")]
    #[case(0, "Unknown")]
    fn test_air_quality_label(#[case] index: u8, #[case] label: &str) {
        assert_eq!(air_quality_label(index), label);
    }

    #[test]
    fn test_format_local_time_in_ist() {
        // 2024-05-01 00:20:00 UTC
        let instant = DateTime::from_timestamp(1_714_522_800, 0).unwrap();
        assert_eq!(format_local_time(instant, chrono_tz::Asia::Kolkata), "05:50 AM");
        assert_eq!(format_optional_time(None, chrono_tz::Asia::Kolkata), "--");
    }
}
