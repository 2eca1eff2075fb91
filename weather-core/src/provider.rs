use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{Config, WeatherError, WeatherModel, error::ConfigError};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Anything that can fetch the current observation for a city.
///
/// The presenter only depends on this, so tests can substitute a double.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Result<WeatherModel, WeatherError>;
}

/// Construct the OpenWeather client from config.
///
/// This is the start-up check: a missing key fails here, before any request is made.
pub fn fetcher_from_config(config: &Config) -> Result<Arc<dyn WeatherFetcher>, ConfigError> {
    Ok(Arc::new(OpenWeatherClient::from_config(config)?))
}
