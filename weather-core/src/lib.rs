//! Core library for the `weather` CLI.
//!
//! This crate defines the fetch-and-present pipeline:
//! - Configuration & credentials handling
//! - The OpenWeather client behind a [`WeatherFetcher`] abstraction
//! - The decoded observation model and its error taxonomy
//! - A presenter that owns the current observation, the selected unit and the nine
//!   display rows, and notifies listeners after each refresh
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod icon;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod units;

#[cfg(test)]
mod test_server;

pub use config::Config;
pub use display::{DisplayRow, ICON_ROW, ROW_COUNT, display_rows};
pub use error::{ConfigError, DecodeError, WeatherError};
pub use events::PresenterEvent;
pub use icon::{IconClient, IconTasks};
pub use model::WeatherModel;
pub use presenter::WeatherPresenter;
pub use provider::{OpenWeatherClient, WeatherFetcher, fetcher_from_config};
pub use units::{TemperatureUnit, convert};
