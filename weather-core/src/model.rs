use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// One decoded current-weather observation, as returned by the OpenWeather
/// `data/2.5/weather` endpoint.
///
/// Temperatures stay in Kelvin exactly as received; see [`crate::units`] for conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherModel {
    #[serde(rename = "coord")]
    pub coordinates: Coordinates,
    /// May be empty (or absent on the wire); presentation falls back in that case.
    #[serde(rename = "weather", default)]
    pub conditions: Vec<Condition>,
    pub base: String,
    pub main: MainReadings,
    #[serde(rename = "visibility")]
    pub visibility_meters: i64,
    pub wind: Wind,
    pub clouds: Clouds,
    #[serde(rename = "dt")]
    pub observed_at_epoch_seconds: i64,
    pub sys: SystemInfo,
    #[serde(rename = "timezone")]
    pub timezone_offset_seconds: i64,
    #[serde(rename = "id")]
    pub city_id: i64,
    #[serde(rename = "name")]
    pub city_name: String,
    #[serde(rename = "cod")]
    pub response_code: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "lat")]
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    #[serde(rename = "main")]
    pub main_category: String,
    pub description: String,
    #[serde(rename = "icon")]
    pub icon_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    #[serde(rename = "temp")]
    pub temperature_kelvin: f64,
    #[serde(rename = "feels_like")]
    pub feels_like_kelvin: f64,
    #[serde(rename = "temp_min")]
    pub temp_min_kelvin: f64,
    #[serde(rename = "temp_max")]
    pub temp_max_kelvin: f64,
    #[serde(rename = "pressure")]
    pub pressure_hpa: i64,
    #[serde(rename = "humidity")]
    pub humidity_percent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    #[serde(rename = "speed")]
    pub speed_meters_per_second: f64,
    #[serde(rename = "deg")]
    pub direction_degrees: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clouds {
    #[serde(rename = "all")]
    pub coverage_percent: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "type")]
    pub kind: i64,
    pub id: i64,
    #[serde(rename = "country")]
    pub country_code: String,
    #[serde(rename = "sunrise")]
    pub sunrise_epoch_seconds: i64,
    #[serde(rename = "sunset")]
    pub sunset_epoch_seconds: i64,
}

impl WeatherModel {
    /// Decode a raw response body. Either every required field is present with the right
    /// type, or nothing is produced.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.observed_at_epoch_seconds, 0)
    }

    pub fn sunrise(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunrise_epoch_seconds, 0)
    }

    pub fn sunset(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunset_epoch_seconds, 0)
    }

    /// UTC offset of the observed city, if the reported shift is in range.
    pub fn local_offset(&self) -> Option<FixedOffset> {
        let secs = i32::try_from(self.timezone_offset_seconds).ok()?;
        FixedOffset::east_opt(secs)
    }
}
