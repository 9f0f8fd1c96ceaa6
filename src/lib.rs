// Flight search API-access layer: provider client, response normalization,
// TTL response cache and request-quota tracking

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod quota;
pub mod transport;

// Re-export key types for convenience
pub use cache::{CacheConfig, CacheStatsReport, ResponseCache, TtlCache};
pub use client::{FlightApi, FlightApiClient};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, ErrorKind};
pub use geo::{Coordinates, FixedLocation, Geolocator, NoGeolocation};
pub use models::{
    Airport, ApiStats, CabinClass, Flight, FlightSearchRequest, FlightSearchResponse,
    FlightSegment, PopularAirport, SortBy,
};
pub use quota::{QuotaTracker, QuotaUsage};
pub use transport::{Endpoint, FlightDataProvider, HttpProvider};
