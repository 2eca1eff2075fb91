use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a response body into a [`crate::WeatherModel`].
///
/// Carries serde_json's message, which includes the line/column of the problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self { message: err.to_string() }
    }
}

/// Per-call failures surfaced by `fetch` / `refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("No data received")]
    NoData,

    #[error("Failed to decode weather data: {0}")]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        WeatherError::Transport(err.without_url().to_string())
    }
}

impl From<url::ParseError> for WeatherError {
    fn from(err: url::ParseError) -> Self {
        WeatherError::InvalidRequest(err.to_string())
    }
}

/// Start-up configuration failures. These are fatal: the binary reports them and exits
/// before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No API key configured.\n\
         Hint: run `weather configure` and enter your OpenWeather API key."
    )]
    MissingApiKey,

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}
