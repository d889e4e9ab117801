//! Geospatial histogram: per-placemark-bucket statistics for ranking
//! observed locations.
//!
//! Built directly on the key-value transaction layer, independent of the
//! content tables. Observed placemarks collapse into canonical buckets;
//! each bucket tracks an observation count, a running coordinate sum (so
//! removal reverses addition exactly), and per-sublocality tallies. Rank
//! keys embed the count in an order-preserving encoding so the
//! highest-count bucket sorts first lexicographically.

pub mod distance;
pub mod histogram;
pub mod placemark;

pub use distance::great_circle_distance;
pub use histogram::{HistogramOptions, PlacemarkHistogram, TopPlacemark};
pub use placemark::{Location, Placemark};
