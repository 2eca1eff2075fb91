use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::{Config, WeatherError, WeatherModel, error::ConfigError};

use super::WeatherFetcher;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let client = Self::new(config.api_key()?.to_owned());

        Ok(match &config.endpoint {
            Some(endpoint) => client.with_endpoint(endpoint.as_str()),
            None => client,
        })
    }

    /// `<endpoint>?q=<city>&appid=<key>`, with the city encoded as a query value.
    ///
    /// The city is not checked for emptiness; rejecting blank input is up to the caller.
    pub fn request_url(&self, city: &str) -> Result<Url, WeatherError> {
        Ok(Url::parse_with_params(
            &self.endpoint,
            &[("q", city), ("appid", self.api_key.as_str())],
        )?)
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherModel, WeatherError> {
        let url = self.request_url(city)?;
        debug!(city, "requesting current weather");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error(city, err))?;

        let status = res.status();
        let body = res.bytes().await.map_err(|err| transport_error(city, err))?;

        if !status.is_success() {
            warn!(city, %status, "weather request rejected upstream");
            return Err(WeatherError::Transport(format!(
                "HTTP status {status}: {}",
                truncate_body(&String::from_utf8_lossy(&body)),
            )));
        }

        if body.is_empty() {
            warn!(city, "weather response had an empty body");
            return Err(WeatherError::NoData);
        }

        let model = WeatherModel::decode(&body).map_err(|err| {
            warn!(city, error = %err, "weather response did not match the expected schema");
            err
        })?;

        debug!(city, name = %model.city_name, "weather observation decoded");
        Ok(model)
    }
}

fn transport_error(city: &str, err: reqwest::Error) -> WeatherError {
    let err = WeatherError::from(err);
    warn!(city, error = %err, "weather request failed");
    err
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
