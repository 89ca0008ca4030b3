//! Cache module for persisting resolved coordinates to disk
//!
//! This module provides a coordinate cache that memoizes address lookups
//! across process restarts. The cache is a pure memoization layer: the
//! absence of a key never means a negative result was recorded, so every
//! miss triggers a fresh lookup. Entries are never expired or evicted.

mod store;

pub use store::CoordinateCache;
