//! Geocoding service: guard, cache check, queueing, and fallback
//!
//! The service is the single entry point the rest of the application uses.
//! Construct one instance at startup and clone the handle wherever lookups
//! are needed; clones share the cache and the lookup queue, so the rate
//! limit holds across all callers.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::cache::CoordinateCache;

use super::key::CacheKey;
use super::queue::LookupQueue;
use super::{Address, Coordinate, Geocoder};

/// Cache-backed, rate-limited address resolver
pub struct GeocodingService<G: Geocoder> {
    geocoder: Arc<G>,
    cache: Arc<CoordinateCache>,
    queue: LookupQueue,
}

impl<G: Geocoder> Clone for GeocodingService<G> {
    fn clone(&self) -> Self {
        Self {
            geocoder: Arc::clone(&self.geocoder),
            cache: Arc::clone(&self.cache),
            queue: self.queue.clone(),
        }
    }
}

impl<G: Geocoder> GeocodingService<G> {
    /// Creates a service with the default persistent cache
    ///
    /// Must be called within a tokio runtime: the queue worker is spawned
    /// here.
    pub fn new(geocoder: G) -> Self {
        Self::with_cache(geocoder, CoordinateCache::persistent())
    }

    /// Creates a service with a custom cache
    ///
    /// Useful for testing or for callers that manage their own storage
    /// location.
    pub fn with_cache(geocoder: G, cache: CoordinateCache) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            cache: Arc::new(cache),
            queue: LookupQueue::spawn(),
        }
    }

    /// Resolves a (city, district, neighborhood) triple to coordinates
    ///
    /// Returns `None` when the city is missing, when the source knows
    /// neither the full address nor the district, or when the lookup fails;
    /// `None` is an ordinary outcome, never an error. A cache hit returns
    /// without touching the queue; a miss waits its turn behind earlier
    /// lookups, so resolution may take several seconds under load.
    pub async fn coordinates_for(
        &self,
        city: &str,
        district: &str,
        neighborhood: &str,
    ) -> Option<Coordinate> {
        if city.trim().is_empty() {
            return None;
        }

        let key = CacheKey::from_parts(city, district, neighborhood);
        if let Some(coordinate) = self.cache.get(&key) {
            log::debug!("cache hit for {key}");
            return Some(coordinate);
        }

        let address = Address::new(city, district, neighborhood);
        let (reply_tx, reply_rx) = oneshot::channel();
        let geocoder = Arc::clone(&self.geocoder);
        let cache = Arc::clone(&self.cache);

        let submitted = self.queue.submit(async move {
            let found = resolve_with_fallback(geocoder.as_ref(), &address).await;
            if let Some(coordinate) = found {
                // A fallback hit is stored under the original
                // neighborhood-specific key, so the identical query next
                // time short-circuits without repeating the fallback.
                cache.insert(&key, coordinate);
            }
            let _ = reply_tx.send(found);
        });

        if !submitted {
            log::warn!("lookup queue is gone; treating address as unresolved");
            return None;
        }

        reply_rx.await.unwrap_or(None)
    }
}

/// Runs the primary lookup, narrowing to the district-level fallback when
/// the source returns zero results
///
/// Both remote calls happen within one queue slot. Errors are logged and
/// mapped to `None`; they never propagate to the caller.
async fn resolve_with_fallback<G: Geocoder>(geocoder: &G, address: &Address) -> Option<Coordinate> {
    let primary = address.primary_query();
    match geocoder.resolve(&primary).await {
        Ok(Some(coordinate)) => return Some(coordinate),
        Ok(None) => log::debug!("no result for {primary:?}, narrowing to district"),
        Err(err) => {
            log::warn!("lookup failed for {primary:?}: {err}");
            return None;
        }
    }

    let fallback = address.fallback_query();
    match geocoder.resolve(&fallback).await {
        Ok(found) => found,
        Err(err) => {
            log::warn!("fallback lookup failed for {fallback:?}: {err}");
            None
        }
    }
}

/// Resolves coordinates for a free-text address
///
/// Thin wrapper over [`GeocodingService::coordinates_for`], kept as the
/// single entry point the vehicle form calls.
pub async fn get_coordinates_from_address<G: Geocoder>(
    service: &GeocodingService<G>,
    city: &str,
    district: &str,
    neighborhood: &str,
) -> Option<Coordinate> {
    service.coordinates_for(city, district, neighborhood).await
}
