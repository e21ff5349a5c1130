//! # Weather Module
//!
//! Open-Meteo integration: geocoding a city name to coordinates and fetching
//! the current weather for those coordinates. The [`theme`] submodule turns
//! the returned weather code into a [`theme::ThemeTag`].
//!
//! Both endpoints are public and need no authentication. Base URLs come
//! from [`crate::config`] so tests and self-hosted instances can point the
//! client elsewhere.

pub mod theme;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    config,
    error::Result,
    types::{CurrentWeather, ForecastResponse, GeoLocation, GeocodingResponse},
    utils::ensure_success,
};

/// Weather lookups the controller depends on.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Resolves a city name to its first geocoding match, if any.
    async fn geocode(&self, city: &str) -> Result<Option<GeoLocation>>;

    /// Fetches the current weather at the given coordinates.
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather>;
}

/// HTTP client for the Open-Meteo geocoding and forecast APIs.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl WeatherClient {
    pub fn new(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        }
    }

    /// Client configured from the environment.
    pub fn from_env() -> Self {
        Self::new(config::geocoding_url(), config::forecast_url())
    }
}

#[async_trait]
impl WeatherApi for WeatherClient {
    async fn geocode(&self, city: &str) -> Result<Option<GeoLocation>> {
        let api_url = format!("{}/v1/search", self.geocoding_url.trim_end_matches('/'));
        debug!(city, "geocoding");

        let response = self
            .http
            .get(&api_url)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.json::<GeocodingResponse>().await?;

        Ok(body.results.and_then(|r| r.into_iter().next()))
    }

    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather> {
        let api_url = format!("{}/v1/forecast", self.forecast_url.trim_end_matches('/'));
        debug!(latitude, longitude, "fetching current weather");

        let response = self
            .http
            .get(&api_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.json::<ForecastResponse>().await?;

        Ok(body.current_weather)
    }
}
