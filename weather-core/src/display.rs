//! The nine fixed rows of the weather list.

use crate::{
    model::WeatherModel,
    units::{TemperatureUnit, convert},
};

/// Number of rows shown per observation. Row 8 is reserved and always blank.
pub const ROW_COUNT: usize = 9;

/// Row carrying the condition icon code.
pub const ICON_ROW: usize = 2;

pub const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow {
    Text(String),
    /// Icon code for the icon collaborator; not rendered as text by the core.
    Icon(String),
    Blank,
}

impl DisplayRow {
    pub fn text(&self) -> &str {
        match self {
            DisplayRow::Text(text) | DisplayRow::Icon(text) => text,
            DisplayRow::Blank => "",
        }
    }
}

/// `280.32` K in Celsius renders as `7.2°C`.
pub fn format_temperature(kelvin: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}°{}", convert(kelvin, unit), unit.letter())
}

pub fn display_rows(model: &WeatherModel, unit: TemperatureUnit) -> [DisplayRow; ROW_COUNT] {
    let condition = model.primary_condition();

    [
        DisplayRow::Text(format_temperature(model.main.temperature_kelvin, unit)),
        DisplayRow::Text(
            condition
                .map(|c| c.description.clone())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        ),
        condition
            .map(|c| DisplayRow::Icon(c.icon_code.clone()))
            .unwrap_or(DisplayRow::Blank),
        DisplayRow::Text(format!("Wind Speed: {:?} m/s", model.wind.speed_meters_per_second)),
        DisplayRow::Text(format!("Humidity: {}%", model.main.humidity_percent)),
        DisplayRow::Text(format!("Pressure: {} hPa", model.main.pressure_hpa)),
        DisplayRow::Text(format!(
            "Lowest Temperature {}",
            format_temperature(model.main.temp_min_kelvin, unit)
        )),
        DisplayRow::Text(format!(
            "Highest Temperature {}",
            format_temperature(model.main.temp_max_kelvin, unit)
        )),
        DisplayRow::Blank,
    ]
}
