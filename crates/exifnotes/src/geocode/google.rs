use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{GeocodeMatch, Geocoder};
use crate::config::GeocodingConfig;
use crate::error::{Error, Result};
use crate::model::Location;

const USER_AGENT: &str = concat!("exifnotes/", env!("CARGO_PKG_VERSION"));

/// Client for the Google Geocoding JSON API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Parse a Geocoding API response body.
///
/// `ZERO_RESULTS` is an empty list, not an error.
///
/// # Errors
///
/// Returns [`Error::Json`] for a malformed body and [`Error::Geocoding`] for
/// any status other than `OK` or `ZERO_RESULTS`.
pub fn parse_response(body: &str) -> Result<Vec<GeocodeMatch>> {
    let response: GeocodeResponse = serde_json::from_str(body)?;
    match response.status.as_str() {
        "OK" => response
            .results
            .into_iter()
            .map(|result| {
                Ok(GeocodeMatch {
                    formatted_address: result.formatted_address,
                    location: Location::new(result.geometry.location.lat, result.geometry.location.lng)?,
                })
            })
            .collect(),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => Err(Error::Geocoding {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        }),
    }
}

impl GoogleGeocoder {
    /// Build a client from the geocoding settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is set, or an HTTP error
    /// if the client cannot be built.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::ConfigValidation {
                message: "geocoding.api_key is not set".to_string(),
            })?;
        Self::new(&config.endpoint, api_key, Duration::from_secs(config.timeout_secs))
    }

    /// Build a client for an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if the client cannot be built.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    async fn request(&self, query: &[(&str, &str)]) -> Result<Vec<GeocodeMatch>> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse(&self, location: Location) -> Result<Option<String>> {
        let latlng = format!("{},{}", location.latitude, location.longitude);
        debug!(latlng = %latlng, "Reverse geocoding");

        let address = self
            .request(&[("latlng", latlng.as_str())])
            .await?
            .into_iter()
            .next()
            .map(|m| m.formatted_address);

        if let Some(address) = &address {
            info!(address = %address, "Reverse geocoding resolved");
        }
        Ok(address)
    }

    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>> {
        debug!(query = %query, "Forward geocoding");
        let matches = self.request(&[("address", query)]).await?;
        debug!(count = matches.len(), "Forward geocoding returned");
        Ok(matches)
    }
}
