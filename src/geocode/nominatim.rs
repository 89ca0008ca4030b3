//! OSM Nominatim address-search client
//!
//! Performs the actual remote lookups behind the geocoding service. The
//! Nominatim usage policy caps clients at roughly one request per second and
//! asks for an identifying contact parameter and User-Agent, which is why
//! every call carries both and is funneled through the serialized lookup
//! queue instead of hitting the API directly.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Coordinate, Geocoder};

/// Default Nominatim search endpoint
const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Contact parameter sent with every request, per the API usage policy
const DEFAULT_CONTACT_EMAIL: &str = "harita@otokonum.com.tr";

/// Identifying User-Agent header value
const CLIENT_USER_AGENT: &str = concat!("otokonum-backoffice/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur during a remote address lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Latitude or longitude in the response was not a number
    #[error("Invalid coordinate in response: {0}")]
    InvalidCoordinate(String),
}

/// A single entry of a Nominatim search response
///
/// Nominatim encodes latitude and longitude as JSON strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Client for the Nominatim address-search API
#[derive(Debug, Clone)]
pub struct NominatimClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
    /// Contact e-mail included in every request
    contact_email: String,
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimClient {
    /// Creates a client with default configuration
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: NOMINATIM_BASE_URL.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
        }
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            http_client: client,
            ..Self::new()
        }
    }

    /// Overrides the contact e-mail sent with every request
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = email.into();
        self
    }

    /// Creates a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new()
        }
    }

    /// Issues one search request for the given free-text query
    ///
    /// Returns `Ok(None)` when the API reports zero results. Coordinates are
    /// parsed from the API's string fields and taken as-is.
    async fn search(&self, query: &str) -> Result<Option<Coordinate>, LookupError> {
        log::debug!("querying address source for {query:?}");

        let results: Vec<SearchResult> = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("email", self.contact_email.as_str()),
            ])
            .header(reqwest::header::USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match results.into_iter().next() {
            Some(result) => coordinate_from_result(result).map(Some),
            None => Ok(None),
        }
    }
}

impl Geocoder for NominatimClient {
    fn resolve(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, LookupError>> + Send {
        self.search(query)
    }
}

/// Parses the string latitude/longitude of a search result
fn coordinate_from_result(result: SearchResult) -> Result<Coordinate, LookupError> {
    let latitude = result
        .lat
        .parse::<f64>()
        .map_err(|_| LookupError::InvalidCoordinate(result.lat.clone()))?;
    let longitude = result
        .lon
        .parse::<f64>()
        .map_err(|_| LookupError::InvalidCoordinate(result.lon.clone()))?;

    Ok(Coordinate {
        latitude,
        longitude,
    })
}
