//! Condition icon retrieval.
//!
//! Independent of the weather pipeline: the front end asks for an icon by the code found
//! in display row 2 and may cancel a stale download when the slot showing it is reused.

use std::{collections::HashMap, hash::Hash};

use reqwest::Client;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;
use url::Url;

use crate::{Config, WeatherError};

pub const DEFAULT_ICON_ENDPOINT: &str = "https://openweathermap.org/img/w";

/// `<base>/<code>.png`. Codes are plain alphanumerics such as `09d`.
pub fn icon_url(base: &str, code: &str) -> Result<Url, WeatherError> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(WeatherError::InvalidRequest(format!("invalid icon code '{code}'")));
    }

    Ok(Url::parse(&format!("{}/{code}.png", base.trim_end_matches('/')))?)
}

#[derive(Debug, Clone)]
pub struct IconClient {
    endpoint: String,
    http: Client,
}

impl Default for IconClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IconClient {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ICON_ENDPOINT.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.icon_endpoint {
            Some(endpoint) => Self::new().with_endpoint(endpoint.as_str()),
            None => Self::new(),
        }
    }

    /// Raw PNG bytes for `code`.
    pub async fn fetch_icon(&self, code: &str) -> Result<Vec<u8>, WeatherError> {
        let url = icon_url(&self.endpoint, code)?;
        debug!(code, "requesting condition icon");

        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if bytes.is_empty() {
            return Err(WeatherError::NoData);
        }

        Ok(bytes.to_vec())
    }
}

/// In-flight icon downloads keyed by the slot that will show them.
///
/// Tracking a new download for a slot aborts the one it replaces.
#[derive(Debug)]
pub struct IconTasks<K: Eq + Hash> {
    inflight: HashMap<K, AbortHandle>,
}

impl<K: Eq + Hash> Default for IconTasks<K> {
    fn default() -> Self {
        Self { inflight: HashMap::new() }
    }
}

impl<K: Eq + Hash> IconTasks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<T>(&mut self, slot: K, task: &JoinHandle<T>) {
        if let Some(previous) = self.inflight.insert(slot, task.abort_handle()) {
            previous.abort();
        }
    }

    /// Returns whether the slot had a tracked task.
    pub fn cancel(&mut self, slot: &K) -> bool {
        match self.inflight.remove(slot) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.inflight.drain() {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}

impl<K: Eq + Hash> Drop for IconTasks<K> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
