//! Otokonum geocoding library
//!
//! Converts free-text Turkish addresses (city, district, neighborhood) into
//! map coordinates for the dealership back office. Lookups go through a
//! persistent coordinate cache and a serialized queue that keeps the remote
//! address-search API under its rate limit.

pub mod cache;
pub mod geocode;

pub use cache::CoordinateCache;
pub use geocode::{
    get_coordinates_from_address, Coordinate, Geocoder, GeocodingService, NominatimClient,
};
