//! Address geocoding for the consignment map
//!
//! This module resolves the free-text (city, district, neighborhood) triples
//! entered in the vehicle form into map coordinates. Resolution is memoized
//! in a persistent cache, and uncached lookups are funneled through a FIFO
//! queue that keeps the remote address-search API under its rate limit.

mod key;
pub mod nominatim;
mod queue;
mod service;

pub use key::CacheKey;
pub use nominatim::{LookupError, NominatimClient};
pub use service::{get_coordinates_from_address, GeocodingService};

use std::future::Future;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair
///
/// Values are taken verbatim from the remote source; no rounding and no
/// range validation is applied. Placement logic downstream decides what to
/// do with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// A free-text Turkish address as entered in the vehicle form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// City ("il"), e.g. "İstanbul"
    pub city: String,
    /// District ("ilçe"), e.g. "Kadıköy"
    pub district: String,
    /// Neighborhood ("mahalle"), e.g. "Fenerbahçe Mahallesi"; may be empty
    pub neighborhood: String,
}

impl Address {
    /// Creates an address from the raw form fields
    pub fn new(
        city: impl Into<String>,
        district: impl Into<String>,
        neighborhood: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            district: district.into(),
            neighborhood: neighborhood.into(),
        }
    }

    /// Free-text query for the neighborhood-specific primary lookup
    ///
    /// Composed from the raw field values, not the normalized forms used for
    /// the cache key.
    pub fn primary_query(&self) -> String {
        format!(
            "{}, {}, {}, Turkey",
            self.neighborhood, self.district, self.city
        )
    }

    /// Narrower query used when the primary lookup yields no results
    pub fn fallback_query(&self) -> String {
        format!("{}, {}, Turkey", self.district, self.city)
    }
}

/// Remote address-search source
///
/// The seam between the geocoding service and the outside world: production
/// code plugs in [`NominatimClient`], tests inject scripted fakes. `Ok(None)`
/// means the source returned zero results, which is a legitimate outcome and
/// not an error.
pub trait Geocoder: Send + Sync + 'static {
    /// Resolves a free-text query to at most one coordinate
    fn resolve(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, LookupError>> + Send;
}
