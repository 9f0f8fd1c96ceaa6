// Flight API client: airport search, nearby airports and flight search
// against a provider with a small monthly request allowance.
// Every lookup goes cache first; only a miss reaches the provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{keys, CacheConfig, ResponseCache, TtlCache};
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::geo::Geolocator;
use crate::models::{
    Airport, ApiStats, FlightSearchRequest, FlightSearchResponse, PopularAirport,
};
use crate::normalize::{normalize_airport_list, normalize_itineraries, FareContext};
use crate::provider::{AirportListEnvelope, FlightSearchEnvelope, ServerStatusEnvelope};
use crate::quota::QuotaTracker;
use crate::transport::{Endpoint, FlightDataProvider, HttpProvider, QueryParams};

// A composite entity id carries this delimiter; a bare id triggers a lookup
const ENTITY_ID_DELIMITER: char = '.';

// code, name, city, country, entity id
const POPULAR_AIRPORTS: &[(&str, &str, &str, &str, &str)] = &[
    ("JFK", "John F. Kennedy International", "New York", "USA", "95673679"),
    ("LAX", "Los Angeles International", "Los Angeles", "USA", "95673620"),
    ("LHR", "London Heathrow", "London", "UK", "95565050"),
    ("CDG", "Charles de Gaulle", "Paris", "France", "95565040"),
    ("DXB", "Dubai International", "Dubai", "UAE", "95673663"),
    ("GRU", "São Paulo Guarulhos", "São Paulo", "Brazil", "95673692"),
];

// What the UI layer consumes
#[async_trait]
pub trait FlightApi: Send + Sync + 'static {
    // Free-text airport autocomplete. Failures degrade to an empty list.
    async fn search_airports(&self, query: &str) -> Vec<PopularAirport>;

    // Airports near a position, or the provider's default list without one.
    // Failures degrade to an empty list.
    async fn get_nearby_airports(&self, lat: Option<f64>, lng: Option<f64>)
        -> Vec<PopularAirport>;

    async fn search_flights(
        &self,
        request: FlightSearchRequest,
    ) -> Result<FlightSearchResponse, ApiError>;

    async fn check_server_status(&self) -> bool;

    fn api_stats(&self) -> ApiStats;

    fn clear_cache(&self);
}

pub struct FlightApiClient {
    config: ClientConfig,
    provider: Arc<dyn FlightDataProvider>,
    cache: Arc<dyn ResponseCache>,
    quota: Arc<QuotaTracker>,
}

impl FlightApiClient {
    pub fn new(
        config: ClientConfig,
        provider: Arc<dyn FlightDataProvider>,
        cache: Arc<dyn ResponseCache>,
        quota: Arc<QuotaTracker>,
    ) -> Self {
        Self {
            config,
            provider,
            cache,
            quota,
        }
    }

    // Client talking HTTP to the configured provider, with a fresh cache and
    // quota tracker.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let provider = HttpProvider::new(&config)?;
        let quota = QuotaTracker::new(config.quota);
        Ok(Self::new(
            config,
            Arc::new(provider),
            Arc::new(TtlCache::new(CacheConfig::default())),
            Arc::new(quota),
        ))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Curated defaults shown before the user types; never hits the provider
    pub fn popular_airports(&self) -> Vec<PopularAirport> {
        POPULAR_AIRPORTS
            .iter()
            .map(|(code, name, city, country, entity_id)| {
                PopularAirport::new(
                    Airport {
                        code: code.to_string(),
                        name: name.to_string(),
                        city: city.to_string(),
                        country: country.to_string(),
                        entity_id: Some(entity_id.to_string()),
                    },
                    true,
                )
            })
            .collect()
    }

    // Nearby airports for wherever `locator` says the caller is. Falls back
    // to the location-less lookup when no position arrives in time.
    pub async fn nearby_airports_from(&self, locator: &dyn Geolocator) -> Vec<PopularAirport> {
        let position = tokio::time::timeout(
            self.config.geolocation_timeout,
            locator.current_position(),
        )
        .await
        .ok()
        .flatten();

        match position {
            Some(coords) => {
                self.get_nearby_airports(Some(coords.lat), Some(coords.lng))
                    .await
            }
            None => {
                debug!("No position available, using default nearby airports");
                self.get_nearby_airports(None, None).await
            }
        }
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.cache.get(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.cache.set(key, Bytes::from(bytes), Some(ttl)),
            Err(e) => warn!("Not caching {}: {}", key, e),
        }
    }

    // Every provider call goes through here so it is counted against the quota
    async fn call(&self, endpoint: Endpoint, params: QueryParams) -> Result<Option<Value>, ApiError> {
        self.quota.record(endpoint.path());
        self.provider.fetch(endpoint, &params).await
    }

    async fn fetch_airports(
        &self,
        endpoint: Endpoint,
        params: QueryParams,
        limit: usize,
        popular: bool,
    ) -> Result<Vec<PopularAirport>, ApiError> {
        let payload = self
            .call(endpoint, params)
            .await?
            .ok_or_else(|| ApiError::Transport("No response data received from API".to_string()))?;

        let envelope: AirportListEnvelope = serde_json::from_value(payload)
            .map_err(|e| ApiError::Transport(format!("unexpected airport response: {}", e)))?;

        match envelope.data {
            Some(records) if envelope.status => {
                Ok(normalize_airport_list(&records, limit, popular))
            }
            _ => Err(ApiError::from_provider_message(envelope.message.as_deref())),
        }
    }

    // Best effort: swap a bare entity id for the one the airport search reports
    async fn resolve_entity_id(&self, code: &str, entity_id: &str) -> String {
        if entity_id.contains(ENTITY_ID_DELIMITER) {
            return entity_id.to_string();
        }

        let resolved = self
            .search_airports(code)
            .await
            .into_iter()
            .find(|airport| airport.code() == code)
            .and_then(|airport| airport.airport.entity_id);

        match resolved {
            Some(resolved) => {
                debug!("Resolved entity id for {}: {} -> {}", code, entity_id, resolved);
                resolved
            }
            None => entity_id.to_string(),
        }
    }

    fn flight_params(
        &self,
        request: &FlightSearchRequest,
        origin_entity_id: String,
        destination_entity_id: String,
    ) -> (QueryParams, FareContext) {
        let defaults = &self.config.search_defaults;
        let cabin_class = request.cabin_class.unwrap_or(defaults.cabin_class);
        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| defaults.currency.clone());

        let mut params: QueryParams = vec![
            ("originSkyId", request.origin_sky_id.clone()),
            ("destinationSkyId", request.destination_sky_id.clone()),
            ("originEntityId", origin_entity_id),
            ("destinationEntityId", destination_entity_id),
            ("date", request.date.format("%Y-%m-%d").to_string()),
            ("cabinClass", cabin_class.as_str().to_string()),
            (
                "adults",
                request.adults.unwrap_or(defaults.adults).to_string(),
            ),
            (
                "sortBy",
                request.sort_by.unwrap_or(defaults.sort_by).as_str().to_string(),
            ),
            ("currency", currency.clone()),
            (
                "market",
                request
                    .market
                    .clone()
                    .unwrap_or_else(|| defaults.market.clone()),
            ),
            (
                "countryCode",
                request
                    .country_code
                    .clone()
                    .unwrap_or_else(|| defaults.country_code.clone()),
            ),
        ];

        if let Some(children) = request.children.filter(|c| *c > 0) {
            params.push(("childrens", children.to_string()));
        }
        if let Some(return_date) = request.return_date {
            params.push(("returnDate", return_date.format("%Y-%m-%d").to_string()));
        }

        let fare = FareContext {
            currency,
            fare_type: cabin_class,
        };
        (params, fare)
    }

    async fn run_flight_search(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<FlightSearchResponse, ApiError> {
        if !request.has_airport_identifiers() {
            return Err(ApiError::Validation(
                "origin and destination airports are required".to_string(),
            ));
        }
        request.validate(&self.config.search_defaults)?;

        let cache_key = keys::flights(
            &request.origin_sky_id,
            &request.destination_sky_id,
            request.date,
            request.return_date,
        );
        if let Some(hit) = self.cached::<FlightSearchResponse>(&cache_key) {
            debug!("Cache hit for flight search {}", cache_key);
            return Ok(hit);
        }

        let (origin_entity_id, destination_entity_id) = futures::future::join(
            self.resolve_entity_id(&request.origin_sky_id, &request.origin_entity_id),
            self.resolve_entity_id(&request.destination_sky_id, &request.destination_entity_id),
        )
        .await;

        let (params, fare) = self.flight_params(request, origin_entity_id, destination_entity_id);
        info!(
            "Searching flights {} -> {} on {}",
            request.origin_sky_id, request.destination_sky_id, request.date
        );

        let payload = self
            .call(Endpoint::SearchFlights, params)
            .await?
            .ok_or_else(|| ApiError::Transport("No response data received from API".to_string()))?;

        let envelope: FlightSearchEnvelope = serde_json::from_value(payload).map_err(|e| {
            ApiError::Transport(format!("unexpected flight search response: {}", e))
        })?;

        if envelope.is_failure() {
            return Err(ApiError::from_provider_message(envelope.message.as_deref()));
        }

        let search_id = envelope.search_id();
        let reported_total = envelope.total_results();
        let itineraries = envelope.into_itineraries();

        if itineraries.is_empty() {
            info!("No flights found for {}", cache_key);
            return Ok(FlightSearchResponse {
                flights: Vec::new(),
                total_results: 0,
                search_id,
                status: true,
            });
        }

        let flights = normalize_itineraries(&itineraries, self.config.limits.flights, &fare);
        let response = FlightSearchResponse {
            total_results: reported_total.unwrap_or(flights.len()),
            flights,
            search_id,
            status: true,
        };

        self.store(&cache_key, &response, self.config.cache_ttl.flights);
        info!(
            "Found {} flights ({} reported)",
            response.flights.len(),
            response.total_results
        );
        Ok(response)
    }
}

#[async_trait]
impl FlightApi for FlightApiClient {
    async fn search_airports(&self, query: &str) -> Vec<PopularAirport> {
        let query = query.trim();
        if query.chars().count() < self.config.limits.min_query_len {
            return Vec::new();
        }

        let cache_key = keys::airports(query);
        if let Some(hit) = self.cached::<Vec<PopularAirport>>(&cache_key) {
            debug!("Cache hit for airport search: {}", query);
            return hit;
        }

        let params = vec![
            ("query", query.to_string()),
            ("locale", self.config.locale.clone()),
        ];
        match self
            .fetch_airports(Endpoint::SearchAirport, params, self.config.limits.airports, false)
            .await
        {
            Ok(airports) => {
                self.store(&cache_key, &airports, self.config.cache_ttl.airports);
                info!("Found {} airports for {:?}", airports.len(), query);
                airports
            }
            Err(e) => {
                warn!("Airport search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn get_nearby_airports(
        &self,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Vec<PopularAirport> {
        // A lone coordinate is as good as none
        let coords = lat.zip(lng);
        let cache_key = keys::nearby(coords.map(|c| c.0), coords.map(|c| c.1));
        if let Some(hit) = self.cached::<Vec<PopularAirport>>(&cache_key) {
            debug!("Cache hit for nearby airports");
            return hit;
        }

        let mut params = vec![("locale", self.config.locale.clone())];
        if let Some((lat, lng)) = coords {
            params.push(("lat", lat.to_string()));
            params.push(("lng", lng.to_string()));
        }

        match self
            .fetch_airports(Endpoint::NearbyAirports, params, self.config.limits.nearby, true)
            .await
        {
            Ok(airports) => {
                self.store(&cache_key, &airports, self.config.cache_ttl.nearby);
                info!("Found {} nearby airports", airports.len());
                airports
            }
            Err(e) => {
                warn!("Nearby airports lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn search_flights(
        &self,
        request: FlightSearchRequest,
    ) -> Result<FlightSearchResponse, ApiError> {
        let result = self.run_flight_search(&request).await;
        if let Err(e) = &result {
            error!("Flight search failed ({:?}): {}", e.kind(), e);
        }
        result
    }

    async fn check_server_status(&self) -> bool {
        if let Some(status) = self.cached::<bool>(keys::SERVER_STATUS) {
            return status;
        }

        let status = match self.call(Endpoint::CheckServer, Vec::new()).await {
            Ok(Some(payload)) => serde_json::from_value::<ServerStatusEnvelope>(payload)
                .map(|envelope| envelope.status)
                .map_err(|e| ApiError::Transport(e.to_string())),
            Ok(None) => Err(ApiError::Transport("empty server status".to_string())),
            Err(e) => Err(e),
        };

        match status {
            Ok(status) => {
                self.store(keys::SERVER_STATUS, &status, self.config.cache_ttl.server_status);
                status
            }
            Err(e) => {
                warn!("Server check failed: {}", e);
                false
            }
        }
    }

    fn api_stats(&self) -> ApiStats {
        ApiStats {
            request_count: self.quota.used(),
            remaining_requests: self.quota.remaining(),
            cache_size: self.cache.len(),
            near_limit: self.quota.is_near_limit(),
        }
    }

    fn clear_cache(&self) {
        self.cache.clear();
        info!("Cache cleared");
    }
}
